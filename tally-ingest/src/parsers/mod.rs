//! One module per supported bank layout.

mod tabular;

pub mod adcb;
pub mod adib;
pub mod al_jazira;
pub mod emirates_islamic;
pub mod fab;
pub mod mashreq;
pub mod rak;
pub mod wio;

pub use adcb::AdcbParser;
pub use adib::AdibParser;
pub use al_jazira::AlJaziraParser;
pub use emirates_islamic::EmiratesIslamicParser;
pub use fab::FabParser;
pub use mashreq::MashreqParser;
pub use rak::RakParser;
pub use wio::WioParser;
