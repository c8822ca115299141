//! Application event handling.
//!
//! Background tasks report completions through [`AppEvent`]; the actual
//! rendered content already arrived via the `Renderer` surface, so these
//! handlers mostly drive the status line and filter stale search results.

use crate::app::{App, AppEvent};
use crate::feed::{Advance, TreeOp};
use crate::render::Renderer;

pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::AdvanceComplete { outcome } => match outcome {
            Some(Advance::Loaded(n)) if n > 0 => {
                app.set_status(format!("Loaded {n} more"));
            }
            // A fully-filtered batch, a throttled trigger, or an exhausted
            // list: the view already shows whatever there is to show.
            Some(_) | None => {}
        },

        AppEvent::SwitchComplete { feed, outcome } => {
            // A later switch may have superseded this one.
            if feed != app.feed {
                return;
            }
            if let Advance::Loaded(n) = outcome {
                app.set_status(format!("Showing {feed} ({n} loaded)"));
            }
        }

        AppEvent::ToggleComplete { id: _, op } => match op {
            TreeOp::Expanded(0) => app.set_status("No visible replies"),
            TreeOp::Expanded(n) => app.set_status(format!("{n} replies")),
            TreeOp::NoChildren => app.set_status("No replies"),
            TreeOp::Collapsed | TreeOp::Ignored | TreeOp::Cancelled => {}
        },

        AppEvent::SearchCompleted {
            query,
            generation,
            results,
        } => {
            if generation != app.search_generation {
                tracing::debug!(query = %query, generation, "Discarding stale search results");
                return;
            }
            match results {
                Ok(mut hits) => {
                    hits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                    let count = hits.len();
                    app.view.set_search_results(hits);
                    app.selected = 0;
                    app.set_status(format!("{count} results for \"{query}\""));
                }
                Err(e) => {
                    tracing::warn!(query = %query, error = %e, "Search failed");
                    // Prior feed content stays untouched behind the banner.
                    app.view.render_error_banner("Search failed.");
                }
            }
        }
    }
}
