//! Author-owned file resolution.
//!
//! Authors upload files and reference them from the body either by bare
//! filename (`![](cat.png)`) or by a storage path that embeds their id
//! (`.../users/<author>/files/cat.png?alt=media`). This pass resolves both
//! forms against the caller's files map, records every file the body uses,
//! and marks video files so they render as `<video controls>`.

use folio_core::{
    ConversionResult, Data, Diagnostic, DiagnosticKind, Document, FilesMap, Node, Severity,
    TransformError, Transformer,
};
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;

use crate::walk_mut;

/// Extensions recognised in author storage paths.
const FILE_EXTENSIONS: &str = "png|jpg|jpeg|gif|svg|mp4|mov";

static VIDEO_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(?:mp4|mov)(?:[?#].*)?$").unwrap());

/// Whether a URL points at a video file.
pub fn is_video_url(url: &str) -> bool {
    VIDEO_URL.is_match(url)
}

/// Resolve author file references and collect the body files map.
pub struct ResolveFiles {
    author_id: String,
    files_map: FilesMap,
    author_path: Regex,
}

impl ResolveFiles {
    /// Create a resolver for one author's files.
    pub fn new(author_id: impl Into<String>, files_map: FilesMap) -> Result<Self, TransformError> {
        let author_id = author_id.into();
        let pattern = format!(
            r"(?i)users/{}/files/([^/]+?\.(?:{FILE_EXTENSIONS}))",
            regex::escape(&author_id)
        );
        let author_path =
            Regex::new(&pattern).map_err(|e| TransformError::InvalidPattern(e.to_string()))?;
        Ok(Self {
            author_id,
            files_map,
            author_path,
        })
    }

    /// Run the pass over a tree in place.
    ///
    /// Returns the body files map and any diagnostics.
    pub fn apply(&self, root: &mut Node) -> (FilesMap, Vec<Diagnostic>) {
        let mut body_files = FilesMap::new();
        let mut warnings = Vec::new();
        walk_mut(root, &mut |node| {
            self.resolve_node(node, &mut body_files, &mut warnings);
        });
        (body_files, warnings)
    }

    /// Filename embedded in an author storage path, if any.
    fn author_filename(&self, url: &str) -> Option<String> {
        let decoded = percent_decode_str(url).decode_utf8_lossy();
        self.author_path
            .captures(&decoded)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn resolve_node(&self, node: &mut Node, body_files: &mut FilesMap, warnings: &mut Vec<Diagnostic>) {
        let position = node.position;
        let Some(url) = node.url_mut() else {
            return;
        };

        if let Some(resolved) = self.files_map.get(url.as_str()) {
            tracing::debug!(file = %url, %resolved, "resolved file reference");
            body_files.insert(url.clone(), resolved.clone());
            *url = resolved.clone();
        } else if let Some(filename) = self.author_filename(url) {
            match self.files_map.get(&filename) {
                Some(resolved) => {
                    tracing::debug!(file = %filename, "found author file path");
                    body_files.insert(filename, resolved.clone());
                }
                None => {
                    tracing::warn!(
                        file = %filename,
                        author = %self.author_id,
                        "user-uploaded file referenced in body but missing from files map"
                    );
                    warnings.push(
                        Diagnostic::new(
                            Severity::Warning,
                            DiagnosticKind::MissingFile(filename.clone()),
                            format!("file `{filename}` is referenced but missing from the files map"),
                        )
                        .at(position),
                    );
                }
            }
        }

        if is_video_url(url) {
            node.data
                .merge(&Data::new().h_name("video").prop("controls", true));
        }
    }
}

impl Transformer for ResolveFiles {
    fn name(&self) -> &str {
        "resolve_files"
    }

    fn transform(&self, mut doc: Document) -> Result<ConversionResult<Document>, TransformError> {
        let (body_files, warnings) = self.apply(&mut doc.content);
        doc.data.body_files_map = Some(body_files);
        Ok(ConversionResult::with_warnings(doc, warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::helpers;
    use folio_core::{NodeKind, NodeType};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tracing_test::traced_test;

    fn files(entries: &[(&str, &str)]) -> FilesMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn resolver(entries: &[(&str, &str)]) -> ResolveFiles {
        ResolveFiles::new("XYZ", files(entries)).unwrap()
    }

    #[rstest]
    #[case("clip.mp4", true)]
    #[case("CLIP.MOV", true)]
    #[case("clip.mp4?alt=media&token=abc", true)]
    #[case("clip.mov#t=10", true)]
    #[case("clip.png", false)]
    #[case("clip.mp4.png", false)]
    #[case("movie.gif", false)]
    fn test_is_video_url(#[case] url: &str, #[case] expected: bool) {
        assert_eq!(is_video_url(url), expected);
    }

    #[test]
    fn test_direct_hit_rewrites_url() {
        let mut root = helpers::root([helpers::paragraph([helpers::image("cat.png", "")])]);
        let (body, warnings) =
            resolver(&[("cat.png", "http://host/cat.png")]).apply(&mut root);

        assert_eq!(body, files(&[("cat.png", "http://host/cat.png")]));
        assert!(warnings.is_empty());
        assert_eq!(
            root.children[0].children[0].url(),
            Some("http://host/cat.png")
        );
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let mut root = helpers::root([helpers::image("Cat.png", "")]);
        let (body, _) = resolver(&[("cat.png", "http://host/cat.png")]).apply(&mut root);
        assert!(body.is_empty());
        assert_eq!(root.children[0].url(), Some("Cat.png"));
    }

    #[test]
    fn test_author_path_records_without_rewrite() {
        let url = "http://127.0.0.1:9199/o/users%2FXYZ%2Ffiles%2FMyImage.png?alt=media";
        let mut root = helpers::root([helpers::image(url, "")]);
        let (body, warnings) =
            resolver(&[("MyImage.png", "http://cdn/MyImage.png")]).apply(&mut root);

        assert_eq!(body, files(&[("MyImage.png", "http://cdn/MyImage.png")]));
        assert!(warnings.is_empty());
        assert_eq!(root.children[0].url(), Some(url));
    }

    #[test]
    fn test_author_path_ignores_extension_case() {
        let mut root = helpers::root([helpers::link("/users/xyz/files/Report.JPEG", [])]);
        let (body, _) = resolver(&[("Report.JPEG", "http://cdn/r")]).apply(&mut root);
        assert_eq!(body.get("Report.JPEG").map(String::as_str), Some("http://cdn/r"));
    }

    #[test]
    fn test_other_author_is_ignored() {
        let mut root = helpers::root([helpers::image("users/ABC/files/cat.png", "")]);
        let (body, warnings) = resolver(&[("cat.png", "http://host/cat.png")]).apply(&mut root);
        assert!(body.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    #[traced_test]
    fn test_missing_author_file_warns() {
        let mut root = helpers::root([helpers::image("users/XYZ/files/gone.png", "")
            .at(helpers::span(4, 2, 30))]);
        let (body, warnings) = resolver(&[]).apply(&mut root);

        assert!(body.is_empty());
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].kind,
            DiagnosticKind::MissingFile("gone.png".to_string())
        );
        assert_eq!(warnings[0].position.map(|p| p.start.line), Some(4));
        assert!(logs_contain("missing from files map"));
    }

    #[test]
    fn test_video_hint_merges_with_existing_data() {
        let image = helpers::image("clip.mp4", "")
            .with_data(Data::new().class("wide").prop("height", "100"));
        let mut root = helpers::root([image]);
        resolver(&[]).apply(&mut root);

        let data = &root.children[0].data;
        assert_eq!(data.h_name.as_deref(), Some("video"));
        assert_eq!(data.classes, vec!["wide".to_string()]);
        assert_eq!(data.properties.get_str("height"), Some("100"));
        assert_eq!(data.properties.get_bool("controls"), Some(true));
    }

    #[test]
    fn test_video_hint_uses_rewritten_url() {
        let mut root = helpers::root([helpers::image("clip", "")]);
        resolver(&[("clip", "http://host/clip.mov?alt=media")]).apply(&mut root);
        assert_eq!(root.children[0].data.h_name.as_deref(), Some("video"));
    }

    #[test]
    fn test_definitions_are_resolved() {
        let mut root = helpers::root([
            helpers::paragraph([helpers::image_reference(
                "dog",
                "",
                folio_core::ReferenceType::Full,
            )]),
            helpers::definition("dog", "foo.mp4", None),
        ]);
        let (body, _) = resolver(&[("foo.mp4", "http://host/foo.mp4")]).apply(&mut root);

        assert_eq!(body, files(&[("foo.mp4", "http://host/foo.mp4")]));
        let def = &root.children[1];
        assert!(matches!(&def.kind, NodeKind::Definition { url, .. } if url == "http://host/foo.mp4"));
        assert_eq!(def.data.h_name.as_deref(), Some("video"));
        // The reference itself carries no URL and is left alone.
        let reference = &root.children[0].children[0];
        assert_eq!(reference.node_type(), NodeType::ImageReference);
        assert!(reference.data.is_empty());
    }

    #[test]
    fn test_each_file_recorded_once() {
        let mut root = helpers::root([helpers::paragraph([
            helpers::image("cat.png", ""),
            helpers::link("cat.png", [helpers::text("again")]),
        ])]);
        let (body, _) = resolver(&[("cat.png", "http://host/cat.png")]).apply(&mut root);
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn test_transform_publishes_map() {
        let doc = Document::new().with_content(helpers::root([helpers::image("cat.png", "")]));
        let result = resolver(&[("cat.png", "http://host/cat.png")])
            .transform(doc)
            .unwrap();
        assert_eq!(
            result.value.body_files_map(),
            Some(&files(&[("cat.png", "http://host/cat.png")]))
        );
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_transform_publishes_empty_map() {
        let doc = Document::new();
        let result = resolver(&[]).transform(doc).unwrap();
        assert_eq!(result.value.body_files_map(), Some(&FilesMap::new()));
    }

    #[test]
    fn test_author_id_is_escaped() {
        let r = ResolveFiles::new("a.b", files(&[("x.png", "u")])).unwrap();
        assert_eq!(r.author_filename("users/a.b/files/x.png"), Some("x.png".to_string()));
        assert_eq!(r.author_filename("users/aXb/files/x.png"), None);
    }
}
