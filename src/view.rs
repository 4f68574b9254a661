//! View - renders the shell screen as plain text
//!
//! Rendering is a pure function of the router location, the session and the
//! UI state, so the shell prints whatever `AppView::render` returns.

use comfy_table::{ContentArrangement, Table};

use crate::controller::Route;
use crate::model::{ActiveView, CatalogEntity, DashboardSummary, Identity, Listing, UiState};

const MAX_CELL_WIDTH: usize = 48;

pub struct AppView;

impl AppView {
    /// Render one screen. Home content only appears when the gate allows it.
    pub fn render(location: Route, identity: Option<&Identity>, can_render_home: bool, ui_state: &UiState) -> String {
        let mut out = String::new();
        out.push_str(&render_top_bar(location, identity, ui_state));

        match location {
            Route::Home if can_render_home => out.push_str(&render_home(ui_state)),
            Route::Signup => out.push_str("Create an account: signup <email> <username> <password>\n"),
            _ => out.push_str("Log in: login <email> <password>   (or `go /signup`)\n"),
        }

        if let Some(error) = &ui_state.error_message {
            out.push_str(&format!("Error: {error}\n"));
        }
        if let Some(status) = &ui_state.status_message {
            out.push_str(&format!("{status}\n"));
        }
        out
    }
}

fn render_top_bar(location: Route, identity: Option<&Identity>, ui_state: &UiState) -> String {
    let who = identity.map(Identity::display_name).unwrap_or("not logged in");
    let view = match location {
        Route::Home => ui_state.active_view.title(),
        _ => "-",
    };
    format!("[{}] {} | view: {}\n", location.path(), who, view)
}

fn render_home(ui_state: &UiState) -> String {
    if ui_state.is_loading {
        return "Loading...\n".to_string();
    }

    let mut out = String::new();
    if let Some(query) = &ui_state.search_query {
        out.push_str(&format!("Results for \"{query}\"\n"));
    }

    let body = match &ui_state.listing {
        Listing::Empty if ui_state.active_view == ActiveView::Dashboard => {
            "Nothing loaded yet. Type `list`.\n".to_string()
        }
        Listing::Empty => format!("No {} loaded. Type `list`.\n", ui_state.active_view.title().to_lowercase()),
        Listing::Dashboard(summary) => render_dashboard(summary),
        Listing::Artists(items) => render_entities(items),
        Listing::Albums(items) => render_entities(items),
        Listing::Songs(items) => render_entities(items),
    };
    out.push_str(&body);
    out
}

fn render_dashboard(summary: &DashboardSummary) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Collection", "Entries"]);
    table.add_row(vec!["Artists".to_string(), summary.artists.to_string()]);
    table.add_row(vec!["Albums".to_string(), summary.albums.to_string()]);
    table.add_row(vec!["Songs".to_string(), summary.songs.to_string()]);
    format!("{table}\n")
}

fn render_entities<T: CatalogEntity>(items: &[T]) -> String {
    if items.is_empty() {
        return "No matching entries.\n".to_string();
    }

    let mut header = vec!["Id".to_string()];
    header.extend(T::FIELDS.iter().map(|field| field.replace('_', " ")));
    header.push("Audio".to_string());

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    for item in items {
        let mut row = vec![item.id().to_string()];
        row.extend(item.field_values().iter().map(|value| truncate_string(value, MAX_CELL_WIDTH)));
        row.push(
            item.audio_url()
                .map(|url| truncate_string(url, MAX_CELL_WIDTH))
                .unwrap_or_default(),
        );
        table.add_row(row);
    }
    format!("{table}\n")
}

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}
