// src/render.rs
use crate::catalog::Response;
use crate::ordering::{FlatEntry, IssueGroup, ResultView};

pub fn render_response_text(r: &Response) -> String {
    match r {
        Response::Status(msg) => format!("{}\n", msg),
        Response::Results(ResultView::Grouped(groups)) => render_grouped_text(groups),
        Response::Results(ResultView::Flat(rows)) => render_flat_text(rows),
    }
}

/// One heading per issue, its articles listed beneath.
pub fn render_grouped_text(groups: &[IssueGroup]) -> String {
    let mut out = String::new();
    for g in groups {
        out.push_str(&format!("## {}\n", g.heading));
        for a in &g.articles {
            out.push_str(&format!("- {} [{}]\n", a.title, a.catalog_id()));
        }
        out.push('\n');
    }
    out
}

/// One line per article with its inline issue label.
pub fn render_flat_text(rows: &[FlatEntry]) -> String {
    let mut out = String::new();
    for r in rows {
        let badge = if r.is_new { " NEW" } else { "" };
        out.push_str(&format!(
            "- {} [{}] 【{}】{}\n",
            r.article.title,
            r.article.catalog_id(),
            r.label,
            badge
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StatusMessage;
    use crate::models::fixtures::article;
    use crate::models::QueryResult;
    use crate::ordering::present;

    #[test]
    fn grouped_text_has_issue_headings() {
        let view = present(
            QueryResult::grouped(vec![article("2153-01", "2153", "2025/08/08")]),
            2153,
        );
        let text = render_response_text(&Response::Results(view));
        assert_eq!(text, "## No.2153(2025/08/08)\n- 2153-01 [2153-01]\n\n");
    }

    #[test]
    fn flat_text_marks_new_rows() {
        let view = present(
            QueryResult::flat(vec![
                article("2153-01", "2153", "2025/08/08"),
                article("2152-01", "2152", ""),
            ]),
            2153,
        );
        let text = render_response_text(&Response::Results(view));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "- 2153-01 [2153-01] 【No.2153(2025/08/08)】 NEW");
        assert_eq!(lines[1], "- 2152-01 [2152-01] 【No.2152】");
    }

    #[test]
    fn status_is_rendered_verbatim() {
        let text = render_response_text(&Response::Status(StatusMessage::LoadFailed));
        assert_eq!(text, "記事データの読み込みに失敗しました。\n");
    }
}
