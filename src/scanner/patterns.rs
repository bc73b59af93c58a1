//! 注释剥离与匹配模式
//!
//! 固定的模式集合，按文件类别选择:
//!
//! | 类别          | 剥离                         | 匹配                         |
//! |---------------|------------------------------|------------------------------|
//! | Code          | `/* */` 与 `//` 注释          | `"name"`、`/name"`            |
//! | Markup        | `<!-- -->` 注释              | `"name"`、`/name"`、`>name<`   |
//! | PropertyList  | Info.plist 的 UIAppFonts 数组 | `>name<`                     |
//! | Other         | 无                           | `"name"`、`/name"`、`>name<`   |

use std::borrow::Cow;

use memchr::memmem;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::project::file_kind::TextKind;

static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

// `://` (URL) 之后的内容不当作注释
static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)(^|[^:])//.*$").unwrap());

static MARKUP_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static FONT_DECLARATIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<key>UIAppFonts</key>\s*<array>.*?</array>").unwrap());

/// 按文件类别剥离注释；`is_info_plist` 时额外去掉字体声明
pub fn strip_comments(text: &str, kind: TextKind, is_info_plist: bool) -> Cow<'_, str> {
    match kind {
        TextKind::Code => {
            let without_blocks = BLOCK_COMMENT.replace_all(text, "");
            if !LINE_COMMENT.is_match(&without_blocks) {
                return without_blocks;
            }
            Cow::Owned(LINE_COMMENT.replace_all(&without_blocks, "${1}").into_owned())
        }
        TextKind::Markup => MARKUP_COMMENT.replace_all(text, ""),
        TextKind::PropertyList if is_info_plist => FONT_DECLARATIONS.replace_all(text, ""),
        TextKind::PropertyList | TextKind::Other => Cow::Borrowed(text),
    }
}

/// 文本中是否以该类别的模式提及 `name`
pub fn mentions(text: &str, name: &str, kind: TextKind) -> bool {
    let contains = |needle: String| memmem::find(text.as_bytes(), needle.as_bytes()).is_some();
    let quoted = || contains(format!("\"{name}\""));
    let suffixed = || contains(format!("/{name}\""));
    let tagged = || contains(format!(">{name}<"));

    match kind {
        TextKind::Code => quoted() || suffixed(),
        TextKind::PropertyList => tagged(),
        TextKind::Markup | TextKind::Other => quoted() || suffixed() || tagged(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strip_code_comments() {
        let code = r#"
let a = UIImage(named: "kept")
// let b = UIImage(named: "line")
/* let c = UIImage(named: "block")
   spanning lines */
let url = "https://example.com/path" // trailing "tail"
"#;
        let stripped = strip_comments(code, TextKind::Code, false);
        assert!(stripped.contains("\"kept\""));
        assert!(!stripped.contains("\"line\""));
        assert!(!stripped.contains("\"block\""));
        assert!(!stripped.contains("\"tail\""));
        assert!(stripped.contains("https://example.com/path"));
    }

    #[test]
    fn test_strip_markup_comments() {
        let xib = r#"<image name="kept"/><!-- <image name="hidden"/> -->"#;
        let stripped = strip_comments(xib, TextKind::Markup, false);
        assert_eq!(stripped, r#"<image name="kept"/>"#);
    }

    #[test]
    fn test_strip_fonts_only_from_info_plist() {
        let plist = "<key>UIAppFonts</key>\n<array>\n<string>Brand.ttf</string>\n</array><key>Icon</key><string>Logo</string>";
        let info = strip_comments(plist, TextKind::PropertyList, true);
        let other = strip_comments(plist, TextKind::PropertyList, false);

        assert!(!info.contains("Brand.ttf"));
        assert!(info.contains(">Logo<"));
        assert!(other.contains("Brand.ttf"));
    }

    #[test]
    fn test_mentions_by_kind() {
        assert!(mentions(r#"UIImage(named: "icon")"#, "icon", TextKind::Code));
        assert!(mentions(r#"load("images/icon.png")"#, "icon.png", TextKind::Code));
        assert!(!mentions(r#"let iconView = UIImageView()"#, "icon", TextKind::Code));
        assert!(!mentions("<string>icon</string>", "icon", TextKind::Code));

        assert!(mentions("<string>icon</string>", "icon", TextKind::PropertyList));
        assert!(!mentions(r#""icon""#, "icon", TextKind::PropertyList));

        assert!(mentions(r#"<image name="icon"/>"#, "icon", TextKind::Markup));
        assert!(mentions("<td>icon</td>", "icon", TextKind::Other));
    }

    proptest! {
        /// 剥离后的文本不会比原文更长
        #[test]
        fn prop_stripping_never_grows_text(
            body in "[a-z \"/*\n]{0,64}"
        ) {
            let stripped = strip_comments(&body, TextKind::Code, false);
            prop_assert!(stripped.len() <= body.len());
        }

        /// 引号包裹的名称在代码中总能被找到
        #[test]
        fn prop_quoted_names_are_found(
            name in "[A-Za-z][A-Za-z0-9_-]{0,15}",
            prefix in "[a-z ]{0,10}",
        ) {
            let code = format!("{prefix}load(\"{name}\")");
            prop_assert!(mentions(&code, &name, TextKind::Code));
        }
    }
}
