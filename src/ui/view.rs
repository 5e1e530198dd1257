// ============================================================================
// Vue - Liste des comptes
// ============================================================================
// Dessine l'écran : titre, corps, raccourcis
//
// Le corps suit ViewState::body(), première branche qui matche :
// 1. chargement en cours  -> indicateur
// 2. erreur               -> panneau d'erreur avec l'URL tentée
// 3. liste vide           -> message "Aucun compte trouvé."
// 4. sinon                -> tableau, une ligne par compte, ordre du serveur
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, Body};
use crate::models::Account;

pub const TITLE: &str = " Liste des Comptes ";
pub const LOADING_TEXT: &str = "Chargement des comptes...";
pub const EMPTY_TEXT: &str = "Aucun compte trouvé.";
pub const HEADERS: [&str; 4] = ["ID", "Solde", "Date de Création", "Type"];

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, chunks[0]);
    render_body(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);
}

/// Header, contenu, footer
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Corps
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

fn render_header(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(TITLE)
        .title_alignment(Alignment::Center);

    let text = Line::from(Span::styled(
        "Comptes du service bancaire",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ));

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_body(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    match app.view.body() {
        Body::Loading => {
            let text = vec![
                Line::from(""),
                Line::from(Span::styled(LOADING_TEXT, Style::default().fg(Color::Blue))),
            ];
            let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
        }
        Body::Error(message) => render_error(frame, block, message, &app.endpoint, area),
        Body::Empty => {
            let text = vec![
                Line::from(""),
                Line::from(Span::styled(EMPTY_TEXT, Style::default().fg(Color::Yellow))),
            ];
            let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
        }
        Body::Table(accounts) => render_table(frame, block, accounts, app.selected_index, area),
    }
}

/// Panneau d'erreur : message fixe + URL tentée
fn render_error(frame: &mut Frame, block: Block, message: &str, endpoint: &str, area: Rect) {
    let block = block.border_style(Style::default().fg(Color::Red));

    let text = vec![
        Line::from(vec![
            Span::styled("Erreur : ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::styled(message, Style::default().fg(Color::Red)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("URL de l'API : {}", endpoint),
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}

fn render_table(frame: &mut Frame, block: Block, accounts: &[Account], selected: usize, area: Rect) {
    let header = Row::new(HEADERS.iter().map(|h| Cell::from(*h)))
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    // Une ligne par compte, dans l'ordre renvoyé par le serveur
    let rows: Vec<Row> = accounts.iter().map(account_row).collect();

    let widths = [
        Constraint::Length(8),
        Constraint::Length(14),
        Constraint::Length(18),
        Constraint::Min(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(2)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

fn account_row(account: &Account) -> Row<'static> {
    let balance_style = match account.balance {
        Some(b) if b < 0.0 => Style::default().fg(Color::Red),
        Some(_) => Style::default().fg(Color::Green),
        None => Style::default().fg(Color::Gray),
    };

    Row::new(vec![
        Cell::from(account.id.to_string()),
        Cell::from(format!("{:>12}", account.balance_label())).style(balance_style),
        Cell::from(account.creation_date_label()),
        Cell::from(account.type_label().to_string()),
    ])
}

/// Raccourcis ; "Rafraîchir" devient "Chargement..." (grisé) pendant un chargement
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let key_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled("Appuyez sur ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        let refresh = if app.can_refresh() {
            vec![Span::styled("[r]", key_style), Span::raw(" Rafraîchir  ")]
        } else {
            let disabled = Style::default().fg(Color::DarkGray);
            vec![Span::styled("[r]", disabled), Span::styled(" Chargement...  ", disabled)]
        };

        let mut spans = refresh;
        spans.extend([
            Span::styled("[↑↓ / j k]", key_style),
            Span::raw(" Naviguer  "),
            Span::styled("[q]", key_style),
            Span::raw(" Quitter"),
        ]);
        Line::from(spans)
    };

    let paragraph = Paragraph::new(vec![shortcuts]).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests unitaires
// ============================================================================
// TestBackend : terminal en mémoire, on relit le buffer ligne par ligne
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreationDate;
    use ratatui::{backend::TestBackend, Terminal};

    const ENDPOINT: &str = "http://localhost:8082/comptes";

    fn draw(app: &App) -> Vec<String> {
        let backend = TestBackend::new(120, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer.get(x, y).symbol())
                    .collect::<String>()
            })
            .collect()
    }

    fn screen_contains(lines: &[String], needle: &str) -> bool {
        lines.iter().any(|line| line.contains(needle))
    }

    fn account(id: i64, balance: Option<f64>, date: &str, kind: &str) -> Account {
        Account {
            id: id.into(),
            balance,
            creation_date: Some(CreationDate::Text(date.to_string())),
            account_type: Some(kind.to_string()),
        }
    }

    fn loaded(result: anyhow::Result<Vec<Account>>) -> App {
        let mut app = App::new(ENDPOINT);
        let ticket = app.view.begin_load();
        app.view.finish_load(ticket, result);
        app
    }

    #[test]
    fn test_loading_indicator_on_mount() {
        let app = App::new(ENDPOINT);
        let lines = draw(&app);

        assert!(screen_contains(&lines, LOADING_TEXT));
        assert!(screen_contains(&lines, "Chargement..."));
        assert!(!screen_contains(&lines, "Rafraîchir"));
        assert!(!screen_contains(&lines, EMPTY_TEXT));
    }

    #[test]
    fn test_loading_hides_previous_table() {
        let mut app = loaded(Ok(vec![account(1, Some(1.0), "2024-01-02", "EPARGNE")]));
        app.view.begin_load();
        let lines = draw(&app);

        assert!(screen_contains(&lines, LOADING_TEXT));
        assert!(!screen_contains(&lines, "EPARGNE"));
    }

    #[test]
    fn test_example_row() {
        let app = loaded(Ok(vec![account(1, Some(100.5), "2024-01-02", "EPARGNE")]));
        let lines = draw(&app);

        assert!(screen_contains(&lines, "Date de Création"));
        let row = lines.iter().find(|l| l.contains("EPARGNE")).unwrap();
        let id = row.find('1').unwrap();
        let balance = row.find("100.50").unwrap();
        let date = row.find("02/01/2024").unwrap();
        let kind = row.find("EPARGNE").unwrap();
        assert!(id < balance && balance < date && date < kind);

        assert!(screen_contains(&lines, "Rafraîchir"));
    }

    #[test]
    fn test_rows_follow_server_order() {
        let app = loaded(Ok(vec![
            account(3, Some(30.0), "2024-01-03", "TROIS"),
            account(1, None, "2024-01-01", "UN"),
            account(2, Some(-2.0), "2024-01-02", "DEUX"),
        ]));
        let lines = draw(&app);

        let position = |needle: &str| lines.iter().position(|l| l.contains(needle)).unwrap();
        assert!(position("TROIS") < position("UN"));
        assert!(position("UN") < position("DEUX"));

        let rows = lines
            .iter()
            .filter(|l| l.contains("TROIS") || l.contains(" UN") || l.contains("DEUX"))
            .count();
        assert_eq!(rows, 3);

        let null_row = &lines[position("UN")];
        assert!(null_row.contains("N/A"));
        assert!(lines[position("DEUX")].contains("-2.00"));
    }

    #[test]
    fn test_empty_notice() {
        let app = loaded(Ok(Vec::new()));
        let lines = draw(&app);

        assert!(screen_contains(&lines, EMPTY_TEXT));
        assert!(!screen_contains(&lines, "Date de Création"));
    }

    #[test]
    fn test_error_panel() {
        let app = loaded(Err(anyhow::anyhow!("HTTP 500")));
        let lines = draw(&app);

        assert!(screen_contains(&lines, "Erreur : Impossible de charger les comptes."));
        assert!(screen_contains(&lines, "URL de l'API : http://localhost:8082/comptes"));
        assert!(!screen_contains(&lines, "HTTP 500"));
        assert!(!screen_contains(&lines, "Date de Création"));
        assert!(!screen_contains(&lines, EMPTY_TEXT));
    }

    #[test]
    fn test_quit_confirmation_footer() {
        let mut app = loaded(Ok(Vec::new()));
        app.request_quit();
        let lines = draw(&app);
        assert!(screen_contains(&lines, "à nouveau pour quitter"));
    }
}
