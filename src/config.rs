use crate::error::{AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;

/// 程序配置
///
/// 加载顺序: 默认值 → 配置文件 (TOML) → 环境变量 → 命令行参数
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 同时处理的文档数量
    pub max_concurrent_documents: usize,
    /// 导入文件中追加在题干后的间隔
    pub prompt_spacer: String,
    /// 替换 `$$` 的公式标记（与 LMS 的 MathJax 配置一致）
    pub display_math_marker: String,
    /// 导入文件中的插图占位文字，`{path}` 会被替换为图片路径
    pub figure_marker: String,
    /// LaTeX 文档中插图的宽度
    pub figure_width: String,
    /// 是否打乱选择题答案顺序
    pub randomize: bool,
    /// 随机种子（不设置则使用系统熵）
    pub seed: Option<u64>,
    /// 严格模式：无法识别的行直接报错
    pub strict_lines: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 运行报告文件
    pub report_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_documents: 8,
            prompt_spacer: "<p></p>".to_string(),
            display_math_marker: "~~".to_string(),
            figure_marker: "<b>[INSERT FIGURE HERE: {path}]</b>".to_string(),
            figure_width: "0.5\\textwidth".to_string(),
            randomize: false,
            seed: None,
            strict_lines: false,
            verbose_logging: false,
            report_file: "quizmark_report.txt".to_string(),
        }
    }
}

impl Config {
    /// 从 TOML 配置文件加载，缺省字段使用默认值
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::AppError::file_read_failed(path.display().to_string(), e))?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })?;
        Ok(config)
    }

    /// 使用环境变量覆盖当前配置
    pub fn with_env(self) -> AppResult<Self> {
        Ok(Self {
            max_concurrent_documents: env_parse("QUIZMARK_MAX_CONCURRENT", "usize")?
                .unwrap_or(self.max_concurrent_documents),
            prompt_spacer: std::env::var("QUIZMARK_PROMPT_SPACER").unwrap_or(self.prompt_spacer),
            display_math_marker: std::env::var("QUIZMARK_MATH_MARKER")
                .unwrap_or(self.display_math_marker),
            figure_marker: std::env::var("QUIZMARK_FIGURE_MARKER").unwrap_or(self.figure_marker),
            figure_width: std::env::var("QUIZMARK_FIGURE_WIDTH").unwrap_or(self.figure_width),
            randomize: env_parse("QUIZMARK_RANDOMIZE", "bool")?.unwrap_or(self.randomize),
            seed: env_parse("QUIZMARK_SEED", "u64")?.or(self.seed),
            strict_lines: env_parse("QUIZMARK_STRICT", "bool")?.unwrap_or(self.strict_lines),
            verbose_logging: env_parse("QUIZMARK_VERBOSE", "bool")?
                .unwrap_or(self.verbose_logging),
            report_file: std::env::var("QUIZMARK_REPORT_FILE").unwrap_or(self.report_file),
        })
    }

    /// 默认值 + 环境变量
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_env()
    }

    /// 导入文件中某张图片的占位文字
    pub fn figure_marker_for(&self, path: &str) -> String {
        self.figure_marker.replace("{path}", path)
    }
}

fn env_parse<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse().map(Some).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }
            .into()
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_markers() {
        let config = Config::default();
        assert_eq!(config.prompt_spacer, "<p></p>");
        assert_eq!(config.display_math_marker, "~~");
        assert_eq!(
            config.figure_marker_for("img/a.png"),
            "<b>[INSERT FIGURE HERE: img/a.png]</b>"
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str("display_math_marker = \"##\"\nseed = 7\n").unwrap();
        assert_eq!(config.display_math_marker, "##");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.prompt_spacer, "<p></p>");
        assert_eq!(config.max_concurrent_documents, 8);
    }

    #[test]
    fn test_from_file_reports_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizmark.toml");
        std::fs::write(&path, "seed = \"not a number\"").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Config(ConfigError::TomlParseFailed { .. })
        ));
    }
}
