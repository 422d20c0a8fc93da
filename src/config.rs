/// 配置管理模組
///
/// 本模組負責加載、驗證和管理系統配置。
/// 配置來源依序為配置文件、`SENTIMENT__*` 環境變數與部署沿用的 `MONGODB_URI` / `MONGODB_DB`。
// 宣告子模組
pub mod loader;
pub mod manager;
pub mod types;
pub mod validation;

// 重新導出常用組件
pub use loader::{ConfigExt, ConfigLoader, Environment};
pub use manager::{get_config, init_config};
pub use types::*;
pub use validation::{validate_config, ValidationError, ValidationUtils, Validator};

#[cfg(test)]
mod tests {
    #[test]
    fn test_module_exports() {
        let _ = super::Environment::Development;
        let _ = super::ValidationUtils::not_empty("test", "field");

        fn _ensure_config_works(cfg: &super::ApplicationConfig) {
            let _ = &cfg.mongo;
            let _ = &cfg.log;
        }
    }
}
