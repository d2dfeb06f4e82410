use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Localized user-facing messages
///
/// Messages are looked up in a static table keyed by `MessageKey`. Templates
/// use `{}` as positional placeholders, filled in order by `localize`.
/// Interface language for status output
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayLanguage {
    // @language: English
    #[default]
    En,
    // @language: Simplified Chinese
    Zh,
}

impl DisplayLanguage {
    // @returns: Lowercase language identifier
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Zh => "zh",
        }
    }
}

impl fmt::Display for DisplayLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for DisplayLanguage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Self::En),
            "zh" | "chinese" | "zh-cn" => Ok(Self::Zh),
            _ => Err(anyhow::anyhow!("Unsupported display language: {}", s)),
        }
    }
}

/// Keys of every message the tool prints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    Converting,
    Converted,
    Failed,
    Skipped,
    NoFilesFound,
    Summary,
    ConversionCompleted,
    AllFilesConverted,
    InvalidSuffix,
    ErrorFileNotFound,
    ErrorMalformedInput,
    ErrorWriteFailure,
    Error,
}

impl MessageKey {
    /// All keys, used to check both tables stay complete
    pub const ALL: [MessageKey; 13] = [
        Self::Converting,
        Self::Converted,
        Self::Failed,
        Self::Skipped,
        Self::NoFilesFound,
        Self::Summary,
        Self::ConversionCompleted,
        Self::AllFilesConverted,
        Self::InvalidSuffix,
        Self::ErrorFileNotFound,
        Self::ErrorMalformedInput,
        Self::ErrorWriteFailure,
        Self::Error,
    ];
}

const EN: &[(MessageKey, &str)] = &[
    (MessageKey::Converting, "Converting {} file(s) in {}"),
    (MessageKey::Converted, "Converted: {} -> {}"),
    (MessageKey::Failed, "Failed: {} ({})"),
    (MessageKey::Skipped, "Skipped (output exists): {}"),
    (MessageKey::NoFilesFound, "No .ass files found in {}"),
    (MessageKey::Summary, "{} succeeded, {} failed, {} skipped"),
    (MessageKey::ConversionCompleted, "Conversion completed!"),
    (MessageKey::AllFilesConverted, "All files converted successfully!"),
    (MessageKey::InvalidSuffix, "Please enter a valid suffix."),
    (MessageKey::ErrorFileNotFound, "File not found"),
    (MessageKey::ErrorMalformedInput, "Malformed input"),
    (MessageKey::ErrorWriteFailure, "Write failed"),
    (MessageKey::Error, "Error"),
];

const ZH: &[(MessageKey, &str)] = &[
    (MessageKey::Converting, "正在转换 {} 个文件，目录：{}"),
    (MessageKey::Converted, "已转换: {} -> {}"),
    (MessageKey::Failed, "失败: {}（{}）"),
    (MessageKey::Skipped, "已跳过（输出已存在）: {}"),
    (MessageKey::NoFilesFound, "在 {} 中未找到 .ass 文件"),
    (MessageKey::Summary, "成功 {} 个，失败 {} 个，跳过 {} 个"),
    (MessageKey::ConversionCompleted, "转换完成！"),
    (MessageKey::AllFilesConverted, "所有文件转换成功！"),
    (MessageKey::InvalidSuffix, "请输入有效的后缀。"),
    (MessageKey::ErrorFileNotFound, "文件不存在"),
    (MessageKey::ErrorMalformedInput, "输入格式错误"),
    (MessageKey::ErrorWriteFailure, "写入失败"),
    (MessageKey::Error, "错误"),
];

fn table(language: DisplayLanguage) -> &'static [(MessageKey, &'static str)] {
    match language {
        DisplayLanguage::En => EN,
        DisplayLanguage::Zh => ZH,
    }
}

/// Raw template for a key, falling back to English if a translation is missing
pub fn message(language: DisplayLanguage, key: MessageKey) -> &'static str {
    let lookup = |entries: &'static [(MessageKey, &'static str)]| {
        entries.iter().find(|(k, _)| *k == key).map(|(_, text)| *text)
    };

    lookup(table(language))
        .or_else(|| lookup(EN))
        .unwrap_or("")
}

/// Fill a template's `{}` placeholders in order
///
/// Extra arguments are ignored; missing ones leave the placeholder empty.
pub fn localize(language: DisplayLanguage, key: MessageKey, args: &[&str]) -> String {
    let template = message(language, key);
    let mut result = String::with_capacity(template.len() + 16);
    let mut args = args.iter();
    let mut rest = template;

    while let Some(pos) = rest.find("{}") {
        result.push_str(&rest[..pos]);
        if let Some(arg) = args.next() {
            result.push_str(arg);
        }
        rest = &rest[pos + 2..];
    }
    result.push_str(rest);

    result
}
