//! OpenStep (ASCII) plist 读取器
//!
//! 覆盖 `project.pbxproj` 与 `.strings` 用到的全部语法:
//! `{ key = value; }` 字典、`( a, b, )` 数组、`<0fbd 77>` 数据、
//! 带转义的引号字符串与裸字符串，以及 `//`、`/* */` 注释。
//! `.strings` 文件的顶层字典没有花括号，读取失败时按此形式重试一次。

use super::{line_at, Dictionary, PlistError, Value};

pub(super) fn parse(text: &str) -> Result<Value, PlistError> {
    let mut parser = Parser::new(text);
    parser.skip_trivia()?;
    if parser.at_end() {
        return Err(PlistError::Empty);
    }

    let start = parser.clone();
    let error = match parser.parse_value() {
        Ok(value) => {
            parser.skip_trivia()?;
            if parser.at_end() {
                return Ok(value);
            }
            parser.error("unexpected content after the root object")
        }
        Err(error) => error,
    };

    // strings 格式: "key" = "value"; 没有外层花括号
    let mut strings = start;
    strings
        .parse_dictionary_body(None)
        .map(Value::Dictionary)
        .map_err(|_| error)
}

#[derive(Clone)]
struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> PlistError {
        PlistError::Syntax {
            line: line_at(self.text, self.pos),
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn expect(&mut self, byte: u8, message: &str) -> Result<(), PlistError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    /// 跳过空白与注释
    fn skip_trivia(&mut self) -> Result<(), PlistError> {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'/') => match self.bytes.get(self.pos + 1) {
                    Some(b'/') => {
                        while let Some(b) = self.peek() {
                            if b == b'\n' {
                                break;
                            }
                            self.pos += 1;
                        }
                    }
                    Some(b'*') => {
                        match memchr::memmem::find(&self.bytes[self.pos + 2..], b"*/") {
                            Some(offset) => self.pos += offset + 4,
                            None => return Err(self.error("unterminated comment")),
                        }
                    }
                    // 以 '/' 开头的裸字符串 (路径)
                    _ => return Ok(()),
                },
                _ => return Ok(()),
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value, PlistError> {
        self.skip_trivia()?;
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some(b'{') => {
                self.pos += 1;
                self.parse_dictionary_body(Some(b'}')).map(Value::Dictionary)
            }
            Some(b'(') => self.parse_array(),
            Some(b'<') => self.parse_data(),
            Some(b'"') | Some(b'\'') => self.parse_quoted().map(Value::String),
            Some(b) if is_unquoted(b) => Ok(Value::String(self.parse_unquoted())),
            Some(b) => Err(self.error(format!("unexpected character '{}'", char::from(b)))),
        }
    }

    /// 字典体；`closing` 为 None 时读到输入结束 (strings 格式)
    fn parse_dictionary_body(&mut self, closing: Option<u8>) -> Result<Dictionary, PlistError> {
        let mut dict = Dictionary::new();
        loop {
            self.skip_trivia()?;
            match (self.peek(), closing) {
                (Some(b), Some(close)) if b == close => {
                    self.pos += 1;
                    return Ok(dict);
                }
                (None, None) => return Ok(dict),
                (None, Some(_)) => return Err(self.error("unterminated dictionary")),
                _ => {}
            }

            let key = self.parse_key()?;
            self.skip_trivia()?;

            // strings 简写: "key";
            if self.peek() == Some(b';') {
                self.pos += 1;
                dict.insert(key.clone(), Value::String(key));
                continue;
            }

            self.expect(b'=', "expected '=' after dictionary key")?;
            let value = self.parse_value()?;
            self.skip_trivia()?;
            self.expect(b';', "expected ';' after dictionary value")?;
            dict.insert(key, value);
        }
    }

    fn parse_key(&mut self) -> Result<String, PlistError> {
        match self.peek() {
            Some(b'"') | Some(b'\'') => self.parse_quoted(),
            Some(b) if is_unquoted(b) => Ok(self.parse_unquoted()),
            _ => Err(self.error("expected a string as dictionary key")),
        }
    }

    fn parse_array(&mut self) -> Result<Value, PlistError> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some(b')') => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                None => return Err(self.error("unterminated array")),
                _ => {}
            }

            items.push(self.parse_value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b')') => {}
                None => return Err(self.error("unterminated array")),
                Some(_) => return Err(self.error("expected ',' or ')' in array")),
            }
        }
    }

    fn parse_data(&mut self) -> Result<Value, PlistError> {
        self.pos += 1;
        let mut data = Vec::new();
        let mut high: Option<u8> = None;
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated data")),
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b) => {
                    let nibble = hex_value(b).ok_or_else(|| self.error("invalid hex digit in data"))?;
                    self.pos += 1;
                    match high.take() {
                        Some(h) => data.push(h << 4 | nibble),
                        None => high = Some(nibble),
                    }
                }
            }
        }
        if high.is_some() {
            return Err(self.error("odd number of hex digits in data"));
        }
        Ok(Value::Data(data))
    }

    fn parse_quoted(&mut self) -> Result<String, PlistError> {
        let quote = self.peek().unwrap_or(b'"');
        self.pos += 1;
        let mut out: Vec<u8> = Vec::new();
        loop {
            let Some(b) = self.peek() else {
                return Err(self.error("unterminated string"));
            };
            self.pos += 1;
            if b == quote {
                break;
            }
            if b == b'\\' {
                self.parse_escape(&mut out)?;
            } else {
                out.push(b);
            }
        }
        String::from_utf8(out).map_err(|_| self.error("string is not valid UTF-8"))
    }

    fn parse_escape(&mut self, out: &mut Vec<u8>) -> Result<(), PlistError> {
        let Some(b) = self.peek() else {
            return Err(self.error("unterminated escape sequence"));
        };
        self.pos += 1;
        let ch = match b {
            b'n' => '\n',
            b't' => '\t',
            b'r' => '\r',
            b'a' => '\u{7}',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'v' => '\u{b}',
            b'U' | b'u' => {
                let mut code = 0u32;
                for _ in 0..4 {
                    let digit = self
                        .peek()
                        .and_then(hex_value)
                        .ok_or_else(|| self.error("invalid \\U escape sequence"))?;
                    code = code << 4 | u32::from(digit);
                    self.pos += 1;
                }
                char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
            }
            b'0'..=b'7' => {
                let mut code = u32::from(b - b'0');
                for _ in 0..2 {
                    match self.peek() {
                        Some(d @ b'0'..=b'7') => {
                            code = code * 8 + u32::from(d - b'0');
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
            }
            // \\ \" \' 以及未知转义: 原样保留字符
            other => {
                out.push(other);
                return Ok(());
            }
        };
        let mut buf = [0u8; 4];
        out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        Ok(())
    }

    fn parse_unquoted(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_unquoted) {
            self.pos += 1;
        }
        self.text[start..self.pos].to_string()
    }
}

fn is_unquoted(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"_$+/:.-".contains(&b)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pbxproj_fragment() {
        let text = r#"// !$*UTF8*$!
{
	archiveVersion = 1;
	objects = {
/* Begin PBXFileReference section */
		0A01 /* main.swift */ = {isa = PBXFileReference; lastKnownFileType = sourcecode.swift; path = main.swift; sourceTree = "<group>"; };
/* End PBXFileReference section */
		0A02 = {isa = PBXGroup; children = (0A01, ); sourceTree = "<group>"; };
	};
	rootObject = 0A03;
}
"#;
        let value = parse(text).unwrap();
        let objects = value.get("objects").and_then(Value::as_dictionary).unwrap();
        assert_eq!(objects.len(), 2);

        let file = &objects["0A01"];
        assert_eq!(file.get("path").and_then(Value::as_str), Some("main.swift"));
        assert_eq!(file.get("sourceTree").and_then(Value::as_str), Some("<group>"));

        let children = objects["0A02"].get("children").and_then(Value::as_array).unwrap();
        assert_eq!(children, &[Value::String("0A01".to_string())]);
    }

    #[test]
    fn test_quoted_escapes() {
        let value = parse(r#"{ a = "line\nnext \"q\" \U00e9 \101"; }"#).unwrap();
        assert_eq!(
            value.get("a").and_then(Value::as_str),
            Some("line\nnext \"q\" é A")
        );
    }

    #[test]
    fn test_unquoted_paths_and_data() {
        let value = parse("{ path = /usr/lib/libz.tbd; blob = <0fbd 77>; }").unwrap();
        assert_eq!(value.get("path").and_then(Value::as_str), Some("/usr/lib/libz.tbd"));
        assert_eq!(value.get("blob"), Some(&Value::Data(vec![0x0f, 0xbd, 0x77])));
    }

    #[test]
    fn test_strings_file_without_braces() {
        let value = parse("/* Greeting */\n\"hello\" = \"Hallo\";\n\"bye\";\n").unwrap();
        assert_eq!(value.get("hello").and_then(Value::as_str), Some("Hallo"));
        assert_eq!(value.get("bye").and_then(Value::as_str), Some("bye"));
    }

    #[test]
    fn test_comment_only_input_is_empty() {
        assert_eq!(parse("  // nothing\n/* still nothing */"), Err(PlistError::Empty));
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = parse("{\n  a = b;\n  c = d\n}").unwrap_err();
        assert_eq!(
            err,
            PlistError::Syntax {
                line: 4,
                message: "expected ';' after dictionary value".to_string()
            }
        );
    }

    #[test]
    fn test_unterminated_structures() {
        assert!(parse("{ a = (b, c; }").is_err());
        assert!(parse("{ a = \"open; }").is_err());
        assert!(parse("{ a = b; /* never closed }").is_err());
        assert!(parse("{ a = <0f1>; }").is_err());
    }
}
