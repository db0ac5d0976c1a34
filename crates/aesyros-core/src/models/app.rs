use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Applications of the Aesyros suite that a license can unlock
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "app_name", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum AppName {
    Align,
    Drive,
    Pulse,
    Catalyst,
    Flow,
    Foresight,
}

impl AppName {
    pub const ALL: [AppName; 6] = [
        AppName::Align,
        AppName::Drive,
        AppName::Pulse,
        AppName::Catalyst,
        AppName::Flow,
        AppName::Foresight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppName::Align => "align",
            AppName::Drive => "drive",
            AppName::Pulse => "pulse",
            AppName::Catalyst => "catalyst",
            AppName::Flow => "flow",
            AppName::Foresight => "foresight",
        }
    }
}

impl std::fmt::Display for AppName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AppName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppName::ALL
            .into_iter()
            .find(|app| app.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown app name: {}", s)))
    }
}
