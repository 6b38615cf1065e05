use clap::Args;

use crate::data::RowPolicy;

use super::upstream::DEFAULT_SHEETS_BASE_URL;

pub const DEFAULT_PROXY_ADDR: &str = "127.0.0.1:8787";

/// Settings for the spreadsheet proxy. Every flag can also come from the
/// environment (or a `.env` file).
#[derive(Args, Debug, Clone)]
pub struct ProxyConfig {
    /// Address to listen on
    #[arg(long, env = "QUIZ_PROXY_ADDR", default_value = DEFAULT_PROXY_ADDR)]
    pub addr: String,

    /// Id of the spreadsheet holding the questions
    #[arg(long, env = "GSHEET_ID")]
    pub sheet_id: String,

    /// Google API key with read access to the spreadsheet
    #[arg(long, env = "GSHEET_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Range to read, header row first
    #[arg(long, env = "GSHEET_RANGE", default_value = "Sheet1")]
    pub range: String,

    /// Base URL of the Sheets API
    #[arg(long, env = "GSHEET_BASE_URL", default_value = DEFAULT_SHEETS_BASE_URL)]
    pub base_url: String,

    /// Drop malformed rows instead of failing the whole response
    #[arg(long)]
    pub skip_invalid: bool,
}

impl ProxyConfig {
    pub fn row_policy(&self) -> RowPolicy {
        if self.skip_invalid {
            RowPolicy::Skip
        } else {
            RowPolicy::Abort
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        proxy: ProxyConfig,
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from([
            "video-quiz",
            "--sheet-id",
            "abc",
            "--api-key",
            "secret",
            "--skip-invalid",
        ]);
        assert_eq!(cli.proxy.sheet_id, "abc");
        assert_eq!(cli.proxy.row_policy(), RowPolicy::Skip);

        let missing = Cli::try_parse_from(["video-quiz", "--api-key", "secret"]);
        if std::env::var_os("GSHEET_ID").is_none() {
            assert!(missing.is_err());
        }
    }
}
