//! Data source implementations

pub mod eks_settings;
pub mod policies;

pub use eks_settings::EksSettingsDataSource;
