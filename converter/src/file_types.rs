//! Extensions the converter accepts.

use std::path::Path;

/// Lower-case extensions, without the dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    // Word
    "doc", "dot", "docx", "dotx", "docm", "dotm", "rtf", "wpd",
    // Excel
    "xls", "xlsx", "xlsm", "xlsb", "xlt", "xltx", "xltm", "csv",
    // PowerPoint
    "ppt", "pptx", "pptm", "pps", "ppsx", "ppsm", "pot", "potx", "potm",
    // Visio (vsdx, vsdm and svg need Visio 2013 or later)
    "vsd", "vsdx", "vsdm", "svg",
    // Publisher
    "pub",
    // Outlook
    "msg", "vcf", "ics",
    // Project (needs Project 2010 or later)
    "mpp",
    // OpenOffice
    "odt", "odp", "ods",
    // Copied as is
    "pdf",
];

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Whether the converter can handle `path`, judged by extension.
pub fn is_supported(path: &Path) -> bool {
    extension(path).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Whether `path` is already a PDF.
pub fn is_pdf(path: &Path) -> bool {
    extension(path).is_some_and(|ext| ext == "pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_families() {
        for name in [
            "a.docx", "a.rtf", "a.xlsx", "a.csv", "a.pptx", "a.vsdx", "a.svg", "a.pub", "a.msg",
            "a.mpp", "a.odt", "a.odp", "a.ods", "a.pdf",
        ] {
            assert!(is_supported(Path::new(name)), "{name} should be supported");
        }
    }

    #[test]
    fn test_unsupported() {
        assert!(!is_supported(Path::new("/s/photo.jpg")));
        assert!(!is_supported(Path::new("/s/archive.zip")));
        assert!(!is_supported(Path::new("/s/README")));
        assert!(!is_supported(Path::new("/s/.docx")));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(is_supported(Path::new("/s/REPORT.DOCX")));
        assert!(is_pdf(Path::new("/s/scan.PDF")));
        assert!(!is_pdf(Path::new("/s/report.docx")));
    }
}
