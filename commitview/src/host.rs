//! Headless view host that writes session state to a text sink.
//!
//! `ConsoleHost` is the binary's `ViewHost`: it remembers what the coordinator
//! told it (readiness, panel set, selection, focus comment) and prints each
//! change as one line. The main loop asks it to print the selected panel after
//! any event that left it dirty.

use std::io::Write;

use commitview_core::{CommentId, Panel, PanelView, ViewHost};
use tracing::warn;

pub struct ConsoleHost<W: Write> {
    out: W,
    content_ready: bool,
    panels: Option<Vec<Panel>>,
    selected: Panel,
    focus: Option<CommentId>,
    /// Set whenever something visible changed since the last `take_dirty`.
    dirty: bool,
}

impl<W: Write> ConsoleHost<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            content_ready: false,
            panels: None,
            selected: Panel::Commit,
            focus: None,
            dirty: false,
        }
    }

    pub fn is_content_ready(&self) -> bool {
        self.content_ready
    }

    pub fn selected(&self) -> Panel {
        self.selected
    }

    pub fn focus(&self) -> Option<CommentId> {
        self.focus
    }

    pub fn panels(&self) -> Option<&[Panel]> {
        self.panels.as_deref()
    }

    /// Switches to the panel at `index` on user request.
    ///
    /// Returns `false` while no panel set is available or when `index` is out
    /// of range. A manual switch drops the deep-link focus.
    pub fn navigate(&mut self, index: usize) -> bool {
        let Some(panel) = self.panels.as_ref().and_then(|panels| panels.get(index).copied()) else {
            self.line(format_args!("panel {} unavailable", index + 1));
            return false;
        };
        self.selected = panel;
        self.focus = None;
        self.dirty = true;
        true
    }

    /// Returns and clears the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Writes a pre-rendered block (usually from [`render_panel`]).
    pub fn show(&mut self, block: &str) {
        self.line(format_args!("{}", block.trim_end()));
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{args}").and_then(|()| self.out.flush()) {
            warn!(error = %e, "failed to write host output");
        }
    }
}

impl<W: Write> ViewHost for ConsoleHost<W> {
    fn set_content_ready(&mut self, ready: bool) {
        self.content_ready = ready;
        self.dirty = true;
        self.line(format_args!("{}", if ready { "[ready]" } else { "[loading]" }));
    }

    fn set_available_panels(&mut self, panels: Option<&[Panel]>) {
        self.panels = panels.map(<[Panel]>::to_vec);
        if let Some(panels) = panels {
            let titles: Vec<String> = panels
                .iter()
                .map(|panel| format!("{}:{}", panel.index() + 1, panel.title()))
                .collect();
            self.line(format_args!("panels {}", titles.join(" | ")));
        }
    }

    fn select_panel(&mut self, panel: Panel, focus: CommentId) {
        self.selected = panel;
        self.focus = Some(focus);
        self.dirty = true;
        self.line(format_args!("-> {} (comment #{focus})", panel.title()));
    }
}

/// Renders a panel as plain text. Marks `focus` in the comment list.
pub fn render_panel(view: &PanelView<'_>, focus: Option<CommentId>) -> String {
    let mut out = String::new();
    match view {
        PanelView::Commit { commit, comments } => {
            out.push_str(&format!("== Commit {}\n", commit.sha));
            let author = match &commit.author_login {
                Some(login) => format!("{} ({login})", commit.author_name),
                None => commit.author_name.clone(),
            };
            out.push_str(&format!("Author: {author}\n"));
            if let Some(date) = &commit.committed_at {
                out.push_str(&format!("Date:   {date}\n"));
            }
            out.push('\n');
            for line in commit.message.lines() {
                out.push_str(&format!("    {line}\n"));
            }
            out.push('\n');
            for file in &commit.files {
                let notes = comments
                    .iter()
                    .filter(|c| c.path.as_deref() == Some(file.filename.as_str()))
                    .count();
                out.push_str(&format!(
                    "  {:<9} +{:<4} -{:<4} {}",
                    file.status, file.additions, file.deletions, file.filename
                ));
                if notes > 0 {
                    out.push_str(&format!("  [{notes} comment(s)]"));
                }
                out.push('\n');
            }
            out.push_str(&format!(
                "{} file(s), +{} -{}\n",
                commit.files.len(),
                commit.additions,
                commit.deletions
            ));
        }
        PanelView::Comments { commit, comments } => {
            out.push_str(&format!("== Comments on {} ({})\n", commit.summary(), comments.len()));
            if comments.is_empty() {
                out.push_str("  no comments\n");
            }
            for comment in comments.iter() {
                let marker = if Some(comment.id) == focus { ">" } else { " " };
                let anchor = match (&comment.path, comment.line) {
                    (Some(path), Some(line)) if comment.is_line_anchored() => format!(" on {path}:{line}"),
                    (Some(path), None) if comment.is_line_anchored() => format!(" on {path}"),
                    _ => String::new(),
                };
                out.push_str(&format!(
                    "{marker} #{} {} at {}{anchor}\n",
                    comment.id, comment.author, comment.created_at
                ));
                for line in comment.body.lines() {
                    out.push_str(&format!("{marker}     {line}\n"));
                }
            }
        }
    }
    out
}
