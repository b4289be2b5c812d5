use std::path::PathBuf;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use snapcmp::{ArtifactKind, SnapshotStore};

const OUTPUT_FILE: &str = "report.html";

struct SnapshotRow {
    name: String,
    reference: Option<String>,
    failure: Option<String>,
    difference: Option<String>,
}

pub fn report_path(store: &SnapshotStore) -> PathBuf {
    store.root().join(OUTPUT_FILE)
}

/// Read an artifact and inline it as a `data:` URI.
fn data_uri(store: &SnapshotStore, kind: ArtifactKind, id: &str) -> Option<String> {
    let bytes = std::fs::read(store.path(kind, id)).ok()?;
    Some(format!("data:image/png;base64,{}", STANDARD.encode(bytes)))
}

/// One row per snapshot with a failure artifact; references without a
/// failure passed and are not shown.
fn collect_rows(store: &SnapshotStore) -> Vec<SnapshotRow> {
    store
        .list_ids(ArtifactKind::Failure)
        .into_iter()
        .map(|id| SnapshotRow {
            reference: data_uri(store, ArtifactKind::Reference, &id),
            failure: data_uri(store, ArtifactKind::Failure, &id),
            difference: data_uri(store, ArtifactKind::Difference, &id),
            name: id,
        })
        .collect()
}

fn build_html(rows: &[SnapshotRow], created_at: &str) -> String {
    let mut body_rows = String::new();

    for row in rows {
        body_rows.push_str(&format!(
            r#"        <tr>
          <td class="name">{name}</td>
          <td>{reference}</td>
          <td>{failure}</td>
          <td>{difference}</td>
        </tr>
"#,
            name = html_escape(&row.name),
            reference = image_cell(ArtifactKind::Reference, &row.name, row.reference.as_deref()),
            failure = image_cell(ArtifactKind::Failure, &row.name, row.failure.as_deref()),
            difference = image_cell(ArtifactKind::Difference, &row.name, row.difference.as_deref()),
        ));
    }

    let summary = format!("{} with differences", rows.len());

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <title>snapcmp review</title>
  <style>
    :root {{ color-scheme: light; }}
    body {{
      font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif;
      margin: 0; padding: 24px;
      background: #f6f7f9; color: #1f2933;
    }}
    h1 {{ margin: 0 0 8px; font-size: 22px; }}
    .meta {{ margin-bottom: 16px; color: #52606d; font-size: 14px; }}
    table {{ width: 100%; border-collapse: collapse; background: #fff; box-shadow: 0 2px 6px rgba(0,0,0,0.05); }}
    th, td {{ border: 1px solid #e4e7eb; padding: 8px; vertical-align: top; text-align: left; }}
    th {{ background: #f0f4f8; font-weight: 600; font-size: 14px; }}
    td img {{ max-width: 100%; height: auto; display: block; background: #fff; image-rendering: pixelated; }}
    td {{ width: 25%; }}
    td.name {{ font-size: 13px; word-break: break-word; width: 25%; }}
    .missing {{ color: #c81e1e; font-style: italic; font-size: 13px; }}
    .empty {{ text-align: center; padding: 48px; color: #52606d; font-size: 16px; }}
  </style>
</head>
<body>
  <h1>snapcmp review</h1>
  <div class="meta">Generated at {created_at} &middot; {summary}</div>
  {content}
</body>
</html>"##,
        content = if body_rows.is_empty() {
            r#"<div class="empty">All snapshots pass — nothing to review.</div>"#.to_string()
        } else {
            format!(
                r#"<table>
    <thead>
      <tr>
        <th>Name</th>
        <th>Reference</th>
        <th>Failure</th>
        <th>Difference</th>
      </tr>
    </thead>
    <tbody>
{body_rows}    </tbody>
  </table>"#
            )
        }
    )
}

fn image_cell(kind: ArtifactKind, name: &str, src: Option<&str>) -> String {
    match src {
        None => format!(r#"<div class="missing">no {kind}</div>"#),
        Some(src) => {
            let escaped = html_escape(name);
            format!(r#"<img src="{src}" alt="{kind} {escaped}" loading="lazy" />"#)
        }
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn utc_timestamp() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let (s, m, h) = (secs % 60, (secs / 60) % 60, (secs / 3600) % 24);
    let (y, mo, d) = epoch_days_to_ymd(secs / 86400);
    format!("{y:04}-{mo:02}-{d:02}T{h:02}:{m:02}:{s:02}Z")
}

/// Convert days since Unix epoch to (year, month, day).
fn epoch_days_to_ymd(mut days: u64) -> (u64, u64, u64) {
    // Civil calendar algorithm (Howard Hinnant)
    days += 719468;
    let era = days / 146097;
    let doe = days - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}

/// Generate `<store>/report.html` and return a short description.
pub fn generate(store: &SnapshotStore) -> Result<String> {
    let rows = collect_rows(store);
    let html = build_html(&rows, &utc_timestamp());

    let out_path = report_path(store);
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&out_path, html)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;

    Ok(format!(
        "{} ({} with differences)",
        out_path.display(),
        rows.len()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_conversion() {
        assert_eq!(epoch_days_to_ymd(0), (1970, 1, 1));
        assert_eq!(epoch_days_to_ymd(19_723), (2024, 1, 1));
    }

    #[test]
    fn empty_report_says_nothing_to_review() {
        let html = build_html(&[], "2024-01-01T00:00:00Z");
        assert!(html.contains("nothing to review"));
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn rows_inline_images_and_escape_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let failure = store.path(ArtifactKind::Failure, "a<b>");
        std::fs::create_dir_all(failure.parent().unwrap()).unwrap();
        std::fs::write(&failure, b"\x89PNG").unwrap();

        let rows = collect_rows(&store);
        assert_eq!(rows.len(), 1);
        let html = build_html(&rows, "now");
        assert!(html.contains("a&lt;b&gt;"));
        assert!(html.contains("data:image/png;base64,iVBORw=="));
        assert!(html.contains("no reference"));
        assert!(html.contains("no difference"));
    }
}
