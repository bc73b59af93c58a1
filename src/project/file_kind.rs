//! 文件类型 (lastKnownFileType) 与扩展名对照表

/// (kind, 扩展名) 对照表，kind 缺省时按扩展名推断
static KIND_EXTENSIONS: &[(&str, &[&str])] = &[
    ("sourcecode.swift", &["swift"]),
    ("sourcecode.c.objc", &["m"]),
    ("sourcecode.cpp.objcpp", &["mm"]),
    ("sourcecode.c.c", &["c"]),
    ("sourcecode.cpp.cpp", &["cpp", "cc", "cxx"]),
    ("sourcecode.c.h", &["h", "pch"]),
    ("sourcecode.cpp.h", &["hpp", "hh", "hxx"]),
    ("sourcecode.metal", &["metal"]),
    ("sourcecode.asm", &["s"]),
    ("sourcecode.text-based-dylib-definition", &["tbd"]),
    ("file.storyboard", &["storyboard"]),
    ("file.xib", &["xib"]),
    ("text.plist.xml", &["plist"]),
    ("text.plist.strings", &["strings"]),
    ("text.plist.stringsdict", &["stringsdict"]),
    ("text.plist.entitlements", &["entitlements"]),
    ("text.xcconfig", &["xcconfig"]),
    ("text.json", &["json"]),
    ("text.html", &["html", "htm"]),
    ("text.xml", &["xml"]),
    ("text.script.sh", &["sh"]),
    ("net.daringfireball.markdown", &["md"]),
    ("text", &["txt"]),
    ("folder.assetcatalog", &["xcassets"]),
    ("archive.ar", &["a"]),
    ("archive.zip", &["zip"]),
    ("compiled.mach-o.dylib", &["dylib"]),
    ("wrapper.framework", &["framework"]),
    ("wrapper.xcframework", &["xcframework"]),
    ("wrapper.xcdatamodel", &["xcdatamodel"]),
    ("wrapper.pb-project", &["xcodeproj"]),
    ("wrapper.workspace", &["xcworkspace"]),
    ("image.png", &["png"]),
    ("image.jpeg", &["jpg", "jpeg"]),
    ("image.gif", &["gif"]),
    ("image.pdf", &["pdf"]),
    ("image.svg", &["svg"]),
    ("audio.wav", &["wav"]),
    ("audio.mp3", &["mp3"]),
    ("file.ttf", &["ttf"]),
    ("file.otf", &["otf"]),
];

/// 编译或在构建时处理的源文件类型
static SOURCE_KINDS: &[&str] = &[
    "sourcecode.swift",
    "sourcecode.c.objc",
    "sourcecode.cpp.objcpp",
    "sourcecode.c.c",
    "sourcecode.cpp.cpp",
    "sourcecode.c.h",
    "sourcecode.cpp.h",
    "sourcecode.metal",
    "sourcecode.asm",
    "file.storyboard",
    "file.xib",
    "text.plist",
    "text.plist.xml",
];

static HEADER_KINDS: &[&str] = &["sourcecode.c.h", "sourcecode.cpp.h"];

/// 工程模型数据文件，永远不作为普通文件处理
static EXCLUDED_KINDS: &[&str] = &["wrapper.pb-project", "wrapper.workspace"];

/// 归档、库与配置文件: 不作为资源候选
static NON_RESOURCE_KINDS: &[&str] = &[
    "archive.ar",
    "compiled.mach-o.dylib",
    "sourcecode.text-based-dylib-definition",
    "wrapper.framework",
    "wrapper.xcframework",
    "text.xcconfig",
    "text.plist.entitlements",
    "folder.assetcatalog",
];

static PROPERTY_LIST_EXTENSIONS: &[&str] = &["plist", "strings", "stringsdict", "entitlements"];

/// 本地化表可以合法地为空，其余 plist 为空即损坏
static MAY_BE_EMPTY_KINDS: &[&str] = &["text.plist.strings", "text.plist.stringsdict"];
static MAY_BE_EMPTY_EXTENSIONS: &[&str] = &["strings", "stringsdict"];

pub const ASSET_CATALOG_KIND: &str = "folder.assetcatalog";

/// 文本扫描时的文件类别，决定注释剥离方式与匹配模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Code,
    Markup,
    PropertyList,
    Other,
}

/// 按扩展名推断 kind (大小写不敏感)
pub fn kind_for_extension(extension: &str) -> Option<&'static str> {
    let extension = extension.to_ascii_lowercase();
    KIND_EXTENSIONS
        .iter()
        .find(|(_, extensions)| extensions.contains(&extension.as_str()))
        .map(|(kind, _)| *kind)
}

pub fn is_excluded_kind(kind: &str) -> bool {
    EXCLUDED_KINDS.contains(&kind)
}

pub fn is_source_kind(kind: &str) -> bool {
    SOURCE_KINDS.contains(&kind)
}

pub fn is_header_kind(kind: &str) -> bool {
    HEADER_KINDS.contains(&kind)
}

pub fn is_non_resource_kind(kind: &str) -> bool {
    NON_RESOURCE_KINDS.contains(&kind)
}

pub fn is_property_list(kind: Option<&str>, extension: Option<&str>) -> bool {
    kind.is_some_and(|k| k.starts_with("text.plist"))
        || extension.is_some_and(|e| PROPERTY_LIST_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

pub fn may_be_empty(kind: Option<&str>, extension: Option<&str>) -> bool {
    kind.is_some_and(|k| MAY_BE_EMPTY_KINDS.contains(&k))
        || extension.is_some_and(|e| MAY_BE_EMPTY_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

pub fn text_kind(kind: Option<&str>) -> TextKind {
    match kind {
        Some(k) if k.starts_with("sourcecode.") => TextKind::Code,
        Some("file.xib") | Some("file.storyboard") => TextKind::Markup,
        Some(k) if k.starts_with("text.plist") => TextKind::PropertyList,
        _ => TextKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_for_extension() {
        assert_eq!(kind_for_extension("swift"), Some("sourcecode.swift"));
        assert_eq!(kind_for_extension("PNG"), Some("image.png"));
        assert_eq!(kind_for_extension("cc"), Some("sourcecode.cpp.cpp"));
        assert_eq!(kind_for_extension("unknown"), None);
    }

    #[test]
    fn test_source_and_header_kinds() {
        assert!(is_source_kind("sourcecode.c.h"));
        assert!(is_header_kind("sourcecode.c.h"));
        assert!(is_source_kind("text.plist.xml"));
        assert!(!is_source_kind("image.png"));
        assert!(!is_source_kind("sourcecode.text-based-dylib-definition"));
    }

    #[test]
    fn test_property_list_detection() {
        assert!(is_property_list(Some("text.plist.strings"), None));
        assert!(is_property_list(None, Some("Entitlements")));
        assert!(!is_property_list(Some("image.png"), Some("png")));
        assert!(may_be_empty(Some("text.plist.strings"), None));
        assert!(may_be_empty(None, Some("stringsdict")));
        assert!(!may_be_empty(Some("text.plist.xml"), Some("plist")));
    }

    #[test]
    fn test_text_kind() {
        assert_eq!(text_kind(Some("sourcecode.swift")), TextKind::Code);
        assert_eq!(text_kind(Some("file.storyboard")), TextKind::Markup);
        assert_eq!(text_kind(Some("text.plist.xml")), TextKind::PropertyList);
        assert_eq!(text_kind(None), TextKind::Other);
    }
}
