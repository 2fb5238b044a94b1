// ==========================================
// 区域划分配置器 - 操作员消息本地化
// ==========================================
// 消息表: locales/zh-CN.yml（默认） / locales/en.yml
// 调用方: ZoneError::user_message, AppState 启动时应用 locale 配置
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 支持的界面语言（首项为回退语言）
pub const SUPPORTED_LOCALES: [&str; 2] = ["zh-CN", "en"];

/// 将配置中的语言值归一化为支持的语言代码
///
/// 接受大小写与下划线变体（"EN_us" -> "en", "zh_cn" -> "zh-CN"）,
/// 无法识别时回退到 zh-CN
pub fn normalize_locale(requested: &str) -> &'static str {
    let lowered = requested.trim().to_lowercase().replace('_', "-");
    match lowered.split('-').next() {
        Some("en") => "en",
        Some("zh") => "zh-CN",
        _ => {
            tracing::warn!(requested, "不支持的界面语言, 回退到 zh-CN");
            SUPPORTED_LOCALES[0]
        }
    }
}

/// 应用界面语言
///
/// # 返回
/// - 实际生效的语言代码
pub fn apply_locale(requested: &str) -> &'static str {
    let locale = normalize_locale(requested);
    rust_i18n::set_locale(locale);
    locale
}

pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 查找消息
///
/// ```no_run
/// use freight_zone_config::i18n::t;
/// let msg = t("zone.geography_not_loaded");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 查找消息并替换 `%{name}` 占位符
///
/// ```no_run
/// use freight_zone_config::i18n::t_with_args;
/// let msg = t_with_args("zone.empty_zone", &[("code", "N1")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(t(key), |message, (name, value)| {
        message.replace(&format!("%{{{}}}", name), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ZoneCode;
    use crate::engine::error::ZoneError;
    use std::sync::Mutex;

    // locale 为进程级全局状态
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn code(s: &str) -> ZoneCode {
        s.parse().unwrap()
    }

    #[test]
    fn test_normalize_locale_variants() {
        assert_eq!(normalize_locale("en"), "en");
        assert_eq!(normalize_locale(" EN_us "), "en");
        assert_eq!(normalize_locale("zh_cn"), "zh-CN");
        assert_eq!(normalize_locale("zh-TW"), "zh-CN");
        assert_eq!(normalize_locale("fr"), "zh-CN");
        assert_eq!(normalize_locale(""), "zh-CN");
    }

    #[test]
    fn test_apply_locale_switches_zone_messages() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();

        assert_eq!(apply_locale("en-GB"), "en");
        assert_eq!(current_locale(), "en");
        assert_eq!(
            t("zone.geography_not_loaded"),
            "Geography data is still loading, please wait"
        );

        assert_eq!(apply_locale("unknown"), "zh-CN");
        assert_eq!(t("zone.geography_not_loaded"), "地理数据尚未加载, 请稍候");
    }

    #[test]
    fn test_placeholders_filled_for_every_zone_message() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        let errors = [
            ZoneError::SelectOrderViolation {
                code: code("N3"),
                expected: Some(code("N2")),
            },
            ZoneError::DeselectOrderViolation {
                code: code("S1"),
                last: Some(code("S4")),
            },
            ZoneError::EmptyZone(code("E2")),
            ZoneError::NavigationLocked(code("NE3")),
            ZoneError::GeographyNotLoaded,
        ];

        for locale in SUPPORTED_LOCALES {
            apply_locale(locale);
            for err in &errors {
                let msg = err.user_message();
                assert!(!msg.contains("%{"), "{}: {}", locale, msg);
                assert!(!msg.contains("zone."), "{}: missing key in {}", locale, msg);
            }
        }

        apply_locale("en");
        let msg = ZoneError::DeselectOrderViolation {
            code: code("S1"),
            last: Some(code("S4")),
        }
        .user_message();
        assert_eq!(
            msg,
            "Zones must be deselected in reverse order: cannot deselect S1, deselect S4 first"
        );

        apply_locale("zh-CN");
        assert_eq!(
            ZoneError::EmptyZone(code("E2")).user_message(),
            "区域 E2 尚未选择任何城市"
        );
    }
}
