#![forbid(unsafe_code)]

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

pub(crate) const DEFAULT_SITE_TITLE: &str = "House inventory";

/// How a tree changelist renders node labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum TreeDisplayMode {
    /// Label prefixed by one indent unit per ancestor.
    Indentation,
    /// Full root-to-node path.
    Breadcrumbs,
}

impl TreeDisplayMode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            TreeDisplayMode::Indentation => "indentation",
            TreeDisplayMode::Breadcrumbs => "breadcrumbs",
        }
    }
}

/// inv_admin: household inventory admin over newline-delimited JSON-RPC on stdio.
#[derive(Clone, Debug, Parser)]
#[command(name = "inv_admin", version, about)]
pub(crate) struct Cli {
    /// Directory holding `inventory.db`.
    #[arg(long, env = "INVENTORY_STORAGE_DIR", default_value = ".inventory")]
    pub(crate) storage_dir: PathBuf,

    /// Actor recorded in the audit log for every mutation.
    #[arg(long, env = "INVENTORY_ACTOR", default_value = "admin")]
    pub(crate) actor: String,

    #[arg(long, env = "SITE_TITLE", default_value = DEFAULT_SITE_TITLE)]
    pub(crate) site_title: String,

    #[arg(long, env = "SITE_HEADER", default_value = DEFAULT_SITE_TITLE)]
    pub(crate) site_header: String,

    #[arg(long, env = "LOCATIONS_DISPLAY_MODE", value_enum, default_value_t = TreeDisplayMode::Indentation)]
    pub(crate) locations_display_mode: TreeDisplayMode,

    #[arg(long, env = "CATEGORIES_DISPLAY_MODE", value_enum, default_value_t = TreeDisplayMode::Breadcrumbs)]
    pub(crate) categories_display_mode: TreeDisplayMode,
}
