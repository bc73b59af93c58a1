//! 属性列表 (Property List) 读取
//!
//! `project.pbxproj` 与 `.strings` 是 OpenStep (ASCII) 格式，由本模块的 [`ascii`] 读取；
//! Info.plist 等资源文件是 XML 或二进制格式，交给 `plist` crate 解析。
//! 两条路径最终都转换为同一棵通用值树 [`Value`]。

mod ascii;

use std::collections::BTreeMap;
use std::io::Cursor;

use thiserror::Error;

/// 字典: 键有序，保证遍历顺序稳定
pub type Dictionary = BTreeMap<String, Value>;

/// 通用值树
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    /// ISO 8601 文本，不做解析
    Date(String),
    Data(Vec<u8>),
    Array(Vec<Value>),
    Dictionary(Dictionary),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// 字典取值，非字典返回 None
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_dictionary().and_then(|dict| dict.get(key))
    }

    fn from_plist(value: ::plist::Value) -> Result<Self, PlistError> {
        use ::plist::Value as Raw;

        Ok(match value {
            Raw::String(s) => Value::String(s),
            Raw::Boolean(b) => Value::Boolean(b),
            Raw::Real(r) => Value::Real(r),
            Raw::Integer(i) => match (i.as_signed(), i.as_unsigned()) {
                (Some(signed), _) => Value::Integer(signed),
                (None, Some(unsigned)) => Value::Real(unsigned as f64),
                (None, None) => return Err(PlistError::Malformed("integer out of range".to_string())),
            },
            Raw::Date(date) => Value::Date(date.to_xml_format()),
            Raw::Data(bytes) => Value::Data(bytes),
            Raw::Uid(uid) => Value::Integer(i64::try_from(uid.get()).unwrap_or(i64::MAX)),
            Raw::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(Value::from_plist)
                    .collect::<Result<_, _>>()?,
            ),
            Raw::Dictionary(dict) => Value::Dictionary(
                dict.into_iter()
                    .map(|(key, value)| Value::from_plist(value).map(|value| (key, value)))
                    .collect::<Result<_, _>>()?,
            ),
            _ => return Err(PlistError::Malformed("unsupported value type".to_string())),
        })
    }
}

/// plist 读取错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlistError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// XML / 二进制解析失败
    #[error("{0}")]
    Malformed(String),

    #[error("file is empty")]
    Empty,

    #[error("text is neither UTF-8 nor UTF-16")]
    Encoding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Xml,
    Ascii,
}

const BINARY_MAGIC: &[u8] = b"bplist";

/// 读取任意格式的 plist
///
/// 空文件 (或只有空白与注释) 返回 [`PlistError::Empty`]，是否可接受由调用方决定。
pub fn parse(bytes: &[u8]) -> Result<Value, PlistError> {
    if bytes.starts_with(BINARY_MAGIC) {
        let raw = ::plist::Value::from_reader(Cursor::new(bytes)).map_err(malformed)?;
        return Value::from_plist(raw);
    }

    let text = decode_text(bytes)?;
    if text.trim().is_empty() {
        return Err(PlistError::Empty);
    }
    match text_format(&text) {
        Format::Xml => {
            let raw = ::plist::Value::from_reader_xml(text.as_bytes()).map_err(malformed)?;
            Value::from_plist(raw)
        }
        Format::Ascii => ascii::parse(&text),
    }
}

/// 校验 plist 是否可读 (完整解析后丢弃结果)
pub fn validate(bytes: &[u8]) -> Result<(), PlistError> {
    parse(bytes).map(|_| ())
}

fn malformed(error: ::plist::Error) -> PlistError {
    PlistError::Malformed(error.to_string())
}

/// `<?xml`、`<!DOCTYPE`、`<!-- -->` 或 `<plist` 开头的是 XML
fn text_format(text: &str) -> Format {
    let head = text.trim_start();
    if head.starts_with("<?xml") || head.starts_with("<!") || head.starts_with("<plist") {
        Format::Xml
    } else {
        Format::Ascii
    }
}

/// 解码文本: UTF-8 (可带 BOM) 或带 BOM 的 UTF-16
///
/// `.strings` 文件经常以 UTF-16 保存
fn decode_text(bytes: &[u8]) -> Result<String, PlistError> {
    if let Some(rest) = bytes.strip_prefix(b"\xEF\xBB\xBF") {
        return String::from_utf8(rest.to_vec()).map_err(|_| PlistError::Encoding);
    }
    if let Some(rest) = bytes.strip_prefix(b"\xFF\xFE") {
        return decode_utf16(rest, u16::from_le_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(b"\xFE\xFF") {
        return decode_utf16(rest, u16::from_be_bytes);
    }
    String::from_utf8(bytes.to_vec()).map_err(|_| PlistError::Encoding)
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String, PlistError> {
    if bytes.len() % 2 != 0 {
        return Err(PlistError::Encoding);
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|_| PlistError::Encoding)
}

/// 字节偏移 -> 1-based 行号
pub(crate) fn line_at(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}
