// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Horizontal composition of badge SVG files.
//!
//! Each configured group is read from the assets directory in order, laid out
//! left to right with cumulative offsets, and written as one combined SVG.
//! Missing or unreadable inputs are skipped with a diagnostic; only failures
//! to write the combined document abort the run. The output is deterministic,
//! so re-running on unchanged inputs rewrites identical bytes.

use std::{
    borrow::Cow,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    config::{BadgeGroup, GroupsDocument},
    error::{self, Error},
    fragment::{BadgeFragment, parse_fragment},
};

/// Outcome of composing one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct Composition
{
    /// Slug of the composed group.
    pub group:        String,
    /// Location of the combined SVG.
    pub output_path:  PathBuf,
    /// Total width of the combined document.
    pub width:        u32,
    /// Height of the combined document.
    pub height:       u32,
    /// Fragments that were placed, in output order.
    pub fragments:    Vec<BadgeFragment,>,
    /// Configured files that were skipped because they were missing or
    /// unreadable.
    pub skipped:      Vec<String,>,
}

/// Fragments of a group laid out left to right.
#[derive(Debug, Clone, Default, PartialEq, Eq,)]
pub struct Layout
{
    /// Positioned fragments in input order.
    pub fragments: Vec<BadgeFragment,>,
    /// Sum of all fragment widths.
    pub width:     u32,
    /// Maximum fragment height, or zero when empty.
    pub height:    u32,
}

impl Layout
{
    /// Appends a fragment at the current right edge.
    pub fn push(&mut self, filename: &str, svg: &str,)
    {
        let parsed = parse_fragment(svg,);
        let fragment = BadgeFragment {
            filename:     filename.to_owned(),
            width:        parsed.width,
            height:       parsed.height,
            inner_markup: parsed.inner_markup,
            x_offset:     self.width,
        };

        self.width = self.width.saturating_add(fragment.width,);
        self.height = self.height.max(fragment.height,);
        self.fragments.push(fragment,);
    }
}

/// Composes every group of `document` in order.
///
/// # Errors
///
/// Stops at the first group whose output cannot be written and returns its
/// [`Error::BadgeIo`](Error::BadgeIo).
pub fn compose_all(
    document: &GroupsDocument,
    assets_dir: &Path,
    output_dir: &Path,
) -> Result<Vec<Composition,>, Error,>
{
    document
        .groups
        .iter()
        .map(|group| compose_group(group, assets_dir, output_dir,),)
        .collect()
}

/// Composes a single group and writes the combined SVG into `output_dir`.
///
/// Missing inputs are logged and skipped, so a group with three of four files
/// present produces a document containing exactly three badges.
///
/// # Errors
///
/// Returns [`Error::BadgeIo`](Error::BadgeIo) when the output directory or
/// file cannot be written.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// use badgesmith::{ComposeConfig, compose_group};
///
/// # fn main() -> Result<(), badgesmith::Error> {
/// let document = ComposeConfig::builtin().normalize()?;
/// let composition = compose_group(&document.groups[0], Path::new("assets"), Path::new("badges"))?;
/// println!("{}x{}", composition.width, composition.height);
/// # Ok(())
/// # }
/// ```
pub fn compose_group(
    group: &BadgeGroup,
    assets_dir: &Path,
    output_dir: &Path,
) -> Result<Composition, Error,>
{
    info!("Composing group '{}' from {} badge files", group.slug, group.files.len());

    let mut layout = Layout::default();
    let mut skipped = Vec::new();

    for filename in &group.files {
        match read_fragment(assets_dir, filename,) {
            Ok(svg,) => {
                layout.push(filename, &svg,);
                if let Some(fragment,) = layout.fragments.last() {
                    info!(
                        "Parsed {} ({}x{}px)",
                        fragment.filename, fragment.width, fragment.height
                    );
                }
            }
            Err(error,) => {
                warn!("Skipping {}: {}", filename, error);
                skipped.push(filename.clone(),);
            }
        }
    }

    info!("Combined size: {}x{}px", layout.width, layout.height);

    fs::create_dir_all(output_dir,).map_err(|source| error::badge_io_error(output_dir, source,),)?;
    let output_path = output_dir.join(&group.output,);
    if let Some(parent,) = output_path.parent() {
        fs::create_dir_all(parent,).map_err(|source| error::badge_io_error(parent, source,),)?;
    }

    let contents = render_combined_svg(&group.label, &layout.fragments,);
    write_svg(&output_path, &contents,)?;

    info!("Wrote {}", output_path.display());
    for (index, fragment,) in layout.fragments.iter().enumerate() {
        info!(
            "  {}. {}: x={}, width={}px",
            index + 1,
            fragment.filename,
            fragment.x_offset,
            fragment.width
        );
    }

    Ok(Composition {
        group: group.slug.clone(),
        output_path,
        width: layout.width,
        height: layout.height,
        fragments: layout.fragments,
        skipped,
    },)
}

fn read_fragment(assets_dir: &Path, filename: &str,) -> Result<String, Error,>
{
    let path = assets_dir.join(filename,);
    if !path.is_file() {
        return Err(Error::MissingFile {
            path,
        },);
    }

    fs::read_to_string(&path,).map_err(|source| error::svg_io_error(&path, source,),)
}

/// Renders the combined document for already positioned fragments.
///
/// The root element declares the summed width and the maximum height, and
/// every fragment is wrapped in a `<g>` translated by its offset. The label
/// is escaped before being written to `aria-label` and `<title>`.
pub fn render_combined_svg(label: &str, fragments: &[BadgeFragment],) -> String
{
    use std::fmt::Write as _;

    let width = fragments.iter().map(|fragment| fragment.width,).fold(0u32, u32::saturating_add,);
    let height = fragments.iter().map(|fragment| fragment.height,).max().unwrap_or(0,);
    let escaped_label = escape_xml(label,);

    let capacity = 256 + fragments.iter().map(|fragment| fragment.inner_markup.len() + 96,).sum::<usize>();
    let mut buffer = String::with_capacity(capacity,);

    let _ = write!(
        buffer,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" role=\"img\" aria-label=\"{escaped_label}\">\n  <title>{escaped_label}</title>",
    );

    for fragment in fragments {
        let _ = write!(
            buffer,
            "\n  <!-- {} -->\n  <g transform=\"translate({}, 0)\">\n    {}\n  </g>",
            escape_comment(&fragment.filename,),
            fragment.x_offset,
            fragment.inner_markup
        );
    }

    buffer.push_str("\n</svg>",);
    buffer
}

fn write_svg(path: &Path, contents: &str,) -> Result<(), Error,>
{
    let file = File::create(path,).map_err(|source| error::badge_io_error(path, source,),)?;
    let mut writer = BufWriter::new(file,);
    writer.write_all(contents.as_bytes(),).map_err(|source| error::badge_io_error(path, source,),)?;
    writer.flush().map_err(|source| error::badge_io_error(path, source,),)
}

fn escape_xml(value: &str,) -> Cow<'_, str,>
{
    if value.chars().any(|character| matches!(character, '&' | '<' | '>' | '\"' | '\''),) {
        let mut escaped = String::with_capacity(value.len(),);
        for character in value.chars() {
            match character {
                '&' => escaped.push_str("&amp;",),
                '<' => escaped.push_str("&lt;",),
                '>' => escaped.push_str("&gt;",),
                '\"' => escaped.push_str("&quot;",),
                '\'' => escaped.push_str("&apos;",),
                other => escaped.push(other,),
            }
        }
        Cow::Owned(escaped,)
    } else {
        Cow::Borrowed(value,)
    }
}

// `--` is not allowed inside XML comments.
fn escape_comment(value: &str,) -> Cow<'_, str,>
{
    if !value.contains("--",) {
        return Cow::Borrowed(value,);
    }

    let mut escaped = String::with_capacity(value.len() * 2,);
    for character in value.chars() {
        if character == '-' && escaped.ends_with('-',) {
            escaped.push(' ',);
        }
        escaped.push(character,);
    }
    Cow::Owned(escaped,)
}

#[cfg(test)]
mod tests
{
    use proptest::prelude::*;
    use tempfile::tempdir;

    use super::*;

    fn badge(width: u32, height: u32, body: &str,) -> String
    {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\">{body}</svg>"
        )
    }

    fn group(files: &[&str],) -> BadgeGroup
    {
        BadgeGroup {
            slug:   "sample".to_owned(),
            label:  "A B".to_owned(),
            output: "sample.svg".to_owned(),
            files:  files.iter().map(|file| (*file).to_owned(),).collect(),
        }
    }

    proptest! {
        #[test]
        fn offsets_are_prefix_sums(dimensions in proptest::collection::vec((0u32..500, 1u32..64), 0..12)) {
            let mut layout = Layout::default();
            for (index, (width, height)) in dimensions.iter().enumerate() {
                layout.push(&format!("{index:02}.svg"), &badge(*width, *height, "<rect/>"));
            }

            let mut expected_offset = 0u32;
            for (fragment, (width, _)) in layout.fragments.iter().zip(&dimensions) {
                prop_assert_eq!(fragment.x_offset, expected_offset);
                expected_offset += *width;
            }
            prop_assert_eq!(layout.width, dimensions.iter().map(|(width, _)| width).sum::<u32>());
            prop_assert_eq!(layout.height, dimensions.iter().map(|(_, height)| *height).max().unwrap_or(0));
        }
    }

    #[test]
    fn two_badges_render_side_by_side()
    {
        let mut layout = Layout::default();
        layout.push("a.svg", &badge(50, 20, "<rect id=\"a\"/>",),);
        layout.push("b.svg", &badge(60, 24, "<rect id=\"b\"/>",),);

        assert_eq!(layout.width, 110);
        assert_eq!(layout.height, 24);

        let svg = render_combined_svg("A B", &layout.fragments,);
        let expected = concat!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"110\" height=\"24\" role=\"img\" aria-label=\"A B\">\n",
            "  <title>A B</title>\n",
            "  <!-- a.svg -->\n",
            "  <g transform=\"translate(0, 0)\">\n",
            "    <rect id=\"a\"/>\n",
            "  </g>\n",
            "  <!-- b.svg -->\n",
            "  <g transform=\"translate(50, 0)\">\n",
            "    <rect id=\"b\"/>\n",
            "  </g>\n",
            "</svg>"
        );
        assert_eq!(svg, expected);
    }

    #[test]
    fn empty_layout_renders_zero_sized_document()
    {
        let svg = render_combined_svg("Nothing", &[],);
        assert!(svg.contains("width=\"0\" height=\"0\""));
        assert!(!svg.contains("<g"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn label_is_escaped()
    {
        let svg = render_combined_svg("C & <C++>", &[],);
        assert!(svg.contains("aria-label=\"C &amp; &lt;C++&gt;\""));
        assert!(svg.contains("<title>C &amp; &lt;C++&gt;</title>"));
    }

    #[test]
    fn comment_never_contains_double_hyphen()
    {
        assert_eq!(escape_comment("01--x.svg"), "01- -x.svg");
        assert!(matches!(escape_comment("01-x.svg"), Cow::Borrowed(_)));
    }

    #[test]
    fn comment_escaping_breaks_long_hyphen_runs()
    {
        let filename = format!(
            "07-{}.svg",
            crate::slug::derive_badge_slug("https://img.shields.io/badge/C++-00599C?logo=cplusplus",)
        );
        assert_eq!(filename, "07-c---00599c.svg");

        let escaped = escape_comment(&filename,);
        assert_eq!(escaped, "07-c- - -00599c.svg");
        assert!(!escaped.contains("--"));
        assert!(!escape_comment("----",).contains("--"));

        let fragment = BadgeFragment {
            filename,
            width: 10,
            height: 20,
            inner_markup: String::new(),
            x_offset: 0,
        };
        let svg = render_combined_svg("C++", &[fragment],);
        let comment = svg.split("<!--",).nth(1,).and_then(|rest| rest.split("-->",).next(),).unwrap_or_default();
        assert!(!comment.contains("--"), "comment body contains a double hyphen: {comment}");
    }

    #[test]
    fn escape_xml_returns_borrowed_when_no_escaping_needed()
    {
        match escape_xml("PNPM Bun",) {
            Cow::Borrowed(value,) => assert_eq!(value, "PNPM Bun"),
            Cow::Owned(_,) => panic!("expected borrowed variant"),
        }
    }

    #[test]
    fn compose_group_skips_missing_files()
    {
        let directory = tempdir().expect("failed to create temp dir",);
        let assets = directory.path().join("assets",);
        let output = directory.path().join("badges",);
        fs::create_dir_all(&assets,).expect("create assets",);
        fs::write(assets.join("01-a.svg",), badge(10, 20, "<a/>",),).expect("write a",);
        fs::write(assets.join("02-b.svg",), badge(20, 28, "<b/>",),).expect("write b",);
        fs::write(assets.join("04-d.svg",), badge(30, 20, "<d/>",),).expect("write d",);

        let composition = compose_group(
            &group(&["01-a.svg", "02-b.svg", "03-c.svg", "04-d.svg"],),
            &assets,
            &output,
        )
        .expect("composition succeeds",);

        assert_eq!(composition.fragments.len(), 3);
        assert_eq!(composition.skipped, ["03-c.svg"]);
        assert_eq!(composition.width, 60);
        assert_eq!(composition.height, 28);
        assert_eq!(composition.fragments[2].x_offset, 30);

        let written = fs::read_to_string(&composition.output_path,).expect("read output",);
        assert_eq!(written.matches("<g transform",).count(), 3);
        assert!(written.contains("translate(30, 0)"));
        assert!(!written.contains("03-c.svg"));
    }

    #[derive(Clone, Default,)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8,>,>,>,);

    impl std::io::Write for CapturedLog
    {
        fn write(&mut self, buffer: &[u8],) -> std::io::Result<usize,>
        {
            self.0.lock().expect("log buffer poisoned",).extend_from_slice(buffer,);
            Ok(buffer.len(),)
        }

        fn flush(&mut self,) -> std::io::Result<(),>
        {
            Ok((),)
        }
    }

    #[test]
    fn per_badge_report_is_visible_at_info_level()
    {
        let directory = tempdir().expect("failed to create temp dir",);
        let assets = directory.path().join("assets",);
        fs::create_dir_all(&assets,).expect("create assets",);
        fs::write(assets.join("01-a.svg",), badge(12, 20, "<a/>",),).expect("write a",);

        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO,)
            .with_ansi(false,)
            .with_writer(move || writer.clone(),)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            compose_group(&group(&["01-a.svg"],), &assets, &directory.path().join("out",),)
                .expect("composition succeeds",)
        },);

        let captured = String::from_utf8(log.0.lock().expect("log buffer poisoned",).clone(),).expect("utf8",);
        assert!(captured.contains("Parsed 01-a.svg (12x20px)"));
        assert!(captured.contains("1. 01-a.svg: x=0, width=12px"));
    }

    #[test]
    fn directory_in_place_of_badge_is_skipped()
    {
        let directory = tempdir().expect("failed to create temp dir",);
        let assets = directory.path().join("assets",);
        fs::create_dir_all(assets.join("01-a.svg",),).expect("create dir",);

        let composition = compose_group(&group(&["01-a.svg"],), &assets, &directory.path().join("out",),)
            .expect("composition succeeds",);
        assert!(composition.fragments.is_empty());
        assert_eq!(composition.skipped, ["01-a.svg"]);
    }

    #[test]
    fn recomposition_is_byte_identical()
    {
        let directory = tempdir().expect("failed to create temp dir",);
        let assets = directory.path().join("assets",);
        let output = directory.path().join("badges",);
        fs::create_dir_all(&assets,).expect("create assets",);
        fs::write(assets.join("01-a.svg",), badge(42, 20, "<a/>",),).expect("write a",);
        fs::write(assets.join("02-b.svg",), badge(17, 20, "<b/>",),).expect("write b",);
        let sample = group(&["01-a.svg", "02-b.svg"],);

        let first = compose_group(&sample, &assets, &output,).expect("first run",);
        let first_bytes = fs::read(&first.output_path,).expect("read first",);
        let second = compose_group(&sample, &assets, &output,).expect("second run",);
        let second_bytes = fs::read(&second.output_path,).expect("read second",);

        assert_eq!(first_bytes, second_bytes);
    }

    #[test]
    fn compose_group_propagates_output_errors()
    {
        let directory = tempdir().expect("failed to create temp dir",);
        let blocked = directory.path().join("blocked",);
        File::create(&blocked,).expect("failed to create placeholder file",);

        let error = compose_group(&group(&["01-a.svg"],), directory.path(), &blocked,)
            .expect_err("expected io failure",);

        match error {
            Error::BadgeIo {
                path, ..
            } => assert_eq!(path, blocked),
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn compose_all_runs_groups_in_order()
    {
        let directory = tempdir().expect("failed to create temp dir",);
        let assets = directory.path().join("assets",);
        let output = directory.path().join("badges",);
        fs::create_dir_all(&assets,).expect("create assets",);
        fs::write(assets.join("a.svg",), badge(5, 20, "",),).expect("write a",);

        let mut second = group(&["a.svg"],);
        second.slug = "second".to_owned();
        second.output = "nested/second.svg".to_owned();
        let document = GroupsDocument {
            groups: vec![group(&["a.svg"],), second],
        };

        let compositions = compose_all(&document, &assets, &output,).expect("compose all",);
        assert_eq!(compositions.len(), 2);
        assert_eq!(compositions[0].group, "sample");
        assert!(output.join("nested/second.svg",).is_file());
    }
}
