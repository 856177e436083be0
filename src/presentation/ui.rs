use crate::application::{App, AppMode, Connection, FormField, WorkflowStatus};
use crate::domain::APP_NAME;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

const LABEL_WIDTH: usize = 19;

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(FormField::ALL.len() as u16 + 3),
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_form(f, app, chunks[1]);
    render_workflow(f, app, chunks[2]);
    render_request_data(f, app, chunks[3]);
    render_status_bar(f, app, chunks[4]);

    match app.mode {
        AppMode::Help => render_help_popup(f, app.help_scroll),
        AppMode::Alert => render_alert_popup(f, app.alert.as_deref().unwrap_or_default()),
        _ => {}
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let submit = if app.can_submit() { "ready to submit" } else { "incomplete" };
    let header = Paragraph::new(format!("{} | {}", APP_NAME, submit))
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn payee_line(connection: &Connection) -> Line<'static> {
    let (text, color) = match connection {
        Connection::Ready(account) => (account.address.clone(), Color::Green),
        Connection::Connecting => ("connecting wallet...".to_string(), Color::Yellow),
        Connection::ConnectionError(e) => (format!("wallet error: {} (Ctrl+W to retry)", e), Color::Red),
        Connection::Disconnected => ("wallet not connected (Ctrl+W to connect)".to_string(), Color::Red),
    };
    Line::from(vec![
        Span::raw(format!("{:<width$}", "Payee *", width = LABEL_WIDTH)),
        Span::styled(text, Style::default().fg(color)),
    ])
}

/// Display text of a field; selects show the entry they resolve to.
fn field_text(app: &App, field: FormField) -> String {
    match field {
        FormField::StorageChain => match app.reference.storage_chain(&app.form.storage_chain_key) {
            Ok(chain) => format!("< {} ({}) >", chain.name, chain.network_type),
            Err(_) => format!("< {} >", app.form.storage_chain_key),
        },
        FormField::Currency => match app.reference.currency(&app.form.currency_key) {
            Ok(currency) => format!("< {} ({}) >", currency.symbol, currency.network),
            Err(_) => format!("< {} >", app.form.currency_key),
        },
        other => app.form.value(other).to_string(),
    }
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let editing = app.mode == AppMode::Normal;
    let mut lines = vec![payee_line(&app.connection)];

    for field in FormField::ALL {
        let focused = editing && field == app.focus;
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let value_style = if focused {
            Style::default().bg(Color::Blue).fg(Color::White)
        } else {
            Style::default()
        };
        let value = match (field, app.connection.account()) {
            (FormField::PaymentRecipient, Some(account)) if app.form.payment_recipient.is_empty() => {
                Span::styled(account.address.clone(), value_style.fg(Color::DarkGray))
            }
            _ => Span::styled(field_text(app, field), value_style),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<width$}", field.label(), width = LABEL_WIDTH), label_style),
            value,
        ]));
    }

    let form = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Request"));
    f.render_widget(form, area);

    if editing && !app.focus.is_select() {
        if let Some(row) = FormField::ALL.iter().position(|field| *field == app.focus) {
            let x = area.x + 1 + LABEL_WIDTH as u16 + app.cursor_position as u16;
            let y = area.y + 2 + row as u16;
            if x < area.right().saturating_sub(1) {
                f.set_cursor_position((x, y));
            }
        }
    }
}

fn render_workflow(f: &mut Frame, app: &App, area: Rect) {
    let status = app.workflow.status();
    let color = match status {
        WorkflowStatus::Confirmed => Color::Green,
        WorkflowStatus::Failed => Color::Red,
        WorkflowStatus::AwaitingInput => Color::White,
        _ => Color::Yellow,
    };
    let state = app
        .result()
        .and_then(|r| r.state())
        .unwrap_or("-")
        .to_string();

    let lines = vec![
        Line::from(vec![
            Span::raw("App status: "),
            Span::styled(status.label(), Style::default().fg(color)),
        ]),
        Line::from(format!("Request state: {}", state)),
    ];
    let widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(widget, area);
}

fn render_request_data(f: &mut Frame, app: &App, area: Rect) {
    let text = match app.result() {
        Some(data) => data.to_pretty_string(),
        None => String::new(),
    };
    let title = match app.request_id() {
        Some(id) => format!("Request data ({})", id),
        None => "Request data".to_string(),
    };
    let widget = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((app.data_scroll.min(u16::MAX as usize) as u16, 0));
    f.render_widget(widget, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let input_text = match app.mode {
        AppMode::Normal => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else {
                "Enter: submit | Ctrl+X: clear | Ctrl+W: connect wallet | Ctrl+S: save | Ctrl+Y: copy id | F1: help | Ctrl+Q: quit".to_string()
            }
        }
        AppMode::Help => "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string(),
        AppMode::Alert => "Enter/Esc: dismiss".to_string(),
        AppMode::SaveAs => format!("Save request data as: {} (Enter to save, Esc to cancel)", app.filename_input),
    };

    let input = Paragraph::new(input_text)
        .block(Block::default().borders(Borders::ALL).title("Keys"))
        .style(match app.mode {
            AppMode::Normal => Style::default(),
            AppMode::Help => Style::default().fg(Color::Cyan),
            AppMode::Alert => Style::default().fg(Color::Red),
            AppMode::SaveAs => Style::default().fg(Color::Yellow),
        });
    f.render_widget(input, area);
}

fn centered(area: Rect, width_pct: u16, height_pct: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(width_pct) / 100) as u16;
    let height = (u32::from(area.height) * u32::from(height_pct) / 100) as u16;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_alert_popup(f: &mut Frame, message: &str) {
    let popup_area = centered(f.area(), 60, 30);
    f.render_widget(Clear, popup_area);

    let alert = Paragraph::new(message.to_string())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Error")
                .style(Style::default().fg(Color::Red)),
        )
        .style(Style::default().fg(Color::White));
    f.render_widget(alert, popup_area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let popup_area = centered(f.area(), 80, 80);
    f.render_widget(Clear, popup_area);

    let help_text = get_help_text();
    let help_lines: Vec<&str> = help_text.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Help (Line {}/{})", start_line + 1, help_lines.len()))
                .style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

fn get_help_text() -> &'static str {
    r#"CREATE A PAYMENT REQUEST

=== REQUIRED FIELDS ===
Payee           Address of the connected wallet (Ctrl+W to connect)
Storage Chain   Chain whose gateway stores the request
Amount          Decimal amount, e.g. 12.5
Currency        Token the payer pays in

=== OPTIONAL FIELDS ===
Payment Recipient   Address receiving the funds (defaults to the payee)
Payer Identity      Address of the payer
Due Date            Free text, e.g. 2026-12-31
Reason              Free text

Addresses must start with 0x and be 42 characters long.

=== EDITING ===
Tab / ↓         Next field
Shift+Tab / ↑   Previous field
← →             Move cursor, or change a Storage Chain / Currency selection
Home / End      Start / end of the field
Backspace/Del   Delete characters

=== ACTIONS ===
Enter           Submit (only when every required field is valid)
Ctrl+X          Clear the form and the request data
Ctrl+W          Connect or reconnect the wallet
Ctrl+S          Save the request data as JSON
Ctrl+Y          Copy the request id to the clipboard
PgUp / PgDn     Scroll the request data
F1              Show this help
Ctrl+Q/Ctrl+C   Quit

=== STATUS ===
awaiting input      Nothing submitted yet
submitting          Building and signing the request
persisting to ipfs  Storing the request through the gateway
persisting on-chain Waiting for the storage transaction to confirm
request confirmed   Done; the request data is shown below
error occurred      See the alert for details

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/q        Close this help window"#
}
