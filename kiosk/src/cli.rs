//! Command-line arguments for the headless kiosk runner

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use shared::{AgeGroup, Gender, ItemId, OptionId, PaymentMethod};

/// Run one scripted kiosk session against an ordering backend
#[derive(Parser, Debug)]
#[command(name = "kiosk", version, about)]
pub struct Args {
    /// Ordering backend base URL
    #[arg(long, env = "KIOSK_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Kiosk account username
    #[arg(long, env = "KIOSK_USERNAME")]
    pub username: String,

    /// Kiosk account password
    #[arg(long, env = "KIOSK_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// HTTP request timeout in seconds
    #[arg(long, env = "KIOSK_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,

    /// Write daily-rolling log files here as well as to stdout
    #[arg(long, env = "KIOSK_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Survey answer: 10s, 20s, 30s, 40s, 50s, 60s_over
    #[arg(long, env = "KIOSK_AGE_GROUP", default_value = "unknown")]
    pub age_group: AgeGroup,

    /// Survey answer: male or female
    #[arg(long, env = "KIOSK_GENDER", default_value = "female")]
    pub gender: Gender,

    /// Item to order, optionally with option ids: `ID` or `ID:OPT,OPT`.
    /// Repeat to order several; each occurrence adds one unit.
    #[arg(long = "item", value_name = "ID[:OPT,...]", required = true)]
    pub items: Vec<ItemSpec>,

    /// cash, credit_card, e_money or qr_code
    #[arg(long, env = "KIOSK_PAYMENT", default_value = "cash")]
    pub payment: PaymentMethod,
}

/// One `--item` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSpec {
    pub item_id: ItemId,
    pub option_ids: Vec<OptionId>,
}

impl FromStr for ItemSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, options) = match s.split_once(':') {
            Some((id, options)) => (id, Some(options)),
            None => (s, None),
        };
        let item_id = id
            .trim()
            .parse()
            .map_err(|_| format!("invalid item id '{}'", id.trim()))?;
        let option_ids = options
            .into_iter()
            .flat_map(|o| o.split(','))
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(|o| o.parse().map_err(|_| format!("invalid option id '{}'", o)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { item_id, option_ids })
    }
}
