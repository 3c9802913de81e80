//! Closed set of supported banks and parser lookup

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

use crate::parser::BankParser;
use crate::parsers::{
    AdcbParser, AdibParser, AlJaziraParser, EmiratesIslamicParser, FabParser, MashreqParser, RakParser,
    WioParser,
};
use crate::types::Line;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Bank {
    Rak,
    EmiratesIslamic,
    Fab,
    Wio,
    Adib,
    Mashreq,
    Adcb,
    AlJazira,
}

impl Bank {
    pub const ALL: [Bank; 8] = [
        Bank::Rak,
        Bank::EmiratesIslamic,
        Bank::Fab,
        Bank::Wio,
        Bank::Adib,
        Bank::Mashreq,
        Bank::Adcb,
        Bank::AlJazira,
    ];

    /// Registry identifier, as accepted on the command line
    pub fn id(&self) -> &'static str {
        match self {
            Bank::Rak => "rak",
            Bank::EmiratesIslamic => "emirates-islamic",
            Bank::Fab => "fab",
            Bank::Wio => "wio",
            Bank::Adib => "adib",
            Bank::Mashreq => "mashreq",
            Bank::Adcb => "adcb",
            Bank::AlJazira => "al-jazira",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Bank::Rak => "RAKBANK",
            Bank::EmiratesIslamic => "Emirates Islamic",
            Bank::Fab => "First Abu Dhabi Bank",
            Bank::Wio => "Wio Bank",
            Bank::Adib => "Abu Dhabi Islamic Bank",
            Bank::Mashreq => "Mashreq",
            Bank::Adcb => "Abu Dhabi Commercial Bank",
            Bank::AlJazira => "Al Jazira",
        }
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown bank {0:?} (expected one of: rak, emirates-islamic, fab, wio, adib, mashreq, adcb, al-jazira)")]
pub struct UnknownBank(pub String);

impl FromStr for Bank {
    type Err = UnknownBank;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        let bank = match key.as_str() {
            "rak" | "rakbank" => Bank::Rak,
            "emiratesislamic" | "ei" => Bank::EmiratesIslamic,
            "fab" | "firstabudhabibank" => Bank::Fab,
            "wio" | "wiobank" => Bank::Wio,
            "adib" | "abudhabiislamicbank" => Bank::Adib,
            "mashreq" | "mashreqbank" => Bank::Mashreq,
            "adcb" | "abudhabicommercialbank" => Bank::Adcb,
            "aljazira" | "aljazirabank" | "aj" => Bank::AlJazira,
            _ => return Err(UnknownBank(s.to_string())),
        };
        Ok(bank)
    }
}

static RAK: LazyLock<RakParser> = LazyLock::new(RakParser::new);
static EMIRATES_ISLAMIC: LazyLock<EmiratesIslamicParser> = LazyLock::new(EmiratesIslamicParser::new);
static FAB: LazyLock<FabParser> = LazyLock::new(FabParser::new);
static WIO: LazyLock<WioParser> = LazyLock::new(WioParser::new);
static ADIB: LazyLock<AdibParser> = LazyLock::new(AdibParser::new);
static MASHREQ: LazyLock<MashreqParser> = LazyLock::new(MashreqParser::new);
static ADCB: LazyLock<AdcbParser> = LazyLock::new(AdcbParser::new);
static AL_JAZIRA: LazyLock<AlJaziraParser> = LazyLock::new(AlJaziraParser::new);

pub fn parser_for(bank: Bank) -> &'static dyn BankParser {
    match bank {
        Bank::Rak => &*RAK,
        Bank::EmiratesIslamic => &*EMIRATES_ISLAMIC,
        Bank::Fab => &*FAB,
        Bank::Wio => &*WIO,
        Bank::Adib => &*ADIB,
        Bank::Mashreq => &*MASHREQ,
        Bank::Adcb => &*ADCB,
        Bank::AlJazira => &*AL_JAZIRA,
    }
}

/// Guess the bank from statement text.
///
/// Lines are scanned top to bottom; the first line carrying any bank's
/// signature decides, with registry order breaking ties inside a line.
pub fn detect_bank(lines: &[Line]) -> Option<Bank> {
    lines.iter().find_map(|line| {
        Bank::ALL
            .into_iter()
            .find(|bank| parser_for(*bank).matches_signature(line))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::split_cells;

    fn line(text: &str) -> Line {
        Line {
            text: text.to_string(),
            cells: split_cells(text),
            page_index: 0,
        }
    }

    #[test]
    fn test_ids_round_trip() {
        for bank in Bank::ALL {
            assert_eq!(bank.id().parse::<Bank>().unwrap(), bank);
            assert_eq!(parser_for(bank).bank(), bank);
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!("Al Jazira".parse::<Bank>().unwrap(), Bank::AlJazira);
        assert_eq!("RAKBANK".parse::<Bank>().unwrap(), Bank::Rak);
        assert_eq!("emirates_islamic".parse::<Bank>().unwrap(), Bank::EmiratesIslamic);
        assert!("hsbc".parse::<Bank>().is_err());
    }

    #[test]
    fn test_detect_earliest_line_wins() {
        let lines = vec![
            line("First Abu Dhabi Bank PJSC"),
            line("01 Feb 2025 01 Feb 2025 TRANSFER TO MASHREQ 100.00 900.00"),
        ];
        assert_eq!(detect_bank(&lines), Some(Bank::Fab));
    }

    #[test]
    fn test_detect_nothing() {
        assert_eq!(detect_bank(&[line("Statement of account")]), None);
    }
}
