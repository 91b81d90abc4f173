use crate::core::{Core, View};
use crate::library::remove_file_extension;
use crate::model::Theme;
use crate::player::Player;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

const APP_TITLE: &str = "forky  ";
const KEY_HINTS: &str =
    "Enter open/play  Esc back  Space pause  n/p skip  ,/. seek  -/+ vol  t theme  o open  : cmd  q quit";

/// A one-line text input drawn over the content.
pub struct PromptView {
    pub title: String,
    pub hint: String,
    pub input: String,
}

#[derive(Clone, Copy)]
struct ThemePalette {
    bg: Color,
    panel_bg: Color,
    panel_alt_bg: Color,
    border: Color,
    text: Color,
    muted: Color,
    accent: Color,
    alert: Color,
    playing: Color,
    selected_bg: Color,
    selected_fg: Color,
    popup_bg: Color,
}

fn palette(theme: Theme) -> ThemePalette {
    match theme {
        Theme::Light => ThemePalette {
            bg: Color::Rgb(246, 246, 243),
            panel_bg: Color::Rgb(255, 255, 255),
            panel_alt_bg: Color::Rgb(238, 240, 244),
            border: Color::Rgb(170, 178, 190),
            text: Color::Rgb(28, 32, 38),
            muted: Color::Rgb(110, 118, 130),
            accent: Color::Rgb(36, 112, 196),
            alert: Color::Rgb(196, 96, 20),
            playing: Color::Rgb(30, 140, 90),
            selected_bg: Color::Rgb(214, 228, 247),
            selected_fg: Color::Rgb(10, 20, 40),
            popup_bg: Color::Rgb(250, 250, 252),
        },
        Theme::Dark => ThemePalette {
            bg: Color::Rgb(10, 15, 24),
            panel_bg: Color::Rgb(19, 29, 43),
            panel_alt_bg: Color::Rgb(24, 38, 58),
            border: Color::Rgb(69, 121, 176),
            text: Color::Rgb(214, 228, 248),
            muted: Color::Rgb(149, 173, 204),
            accent: Color::Rgb(100, 203, 184),
            alert: Color::Rgb(249, 174, 88),
            playing: Color::Rgb(156, 186, 255),
            selected_bg: Color::Rgb(34, 55, 82),
            selected_fg: Color::White,
            popup_bg: Color::Rgb(22, 33, 51),
        },
        Theme::Amoled => ThemePalette {
            bg: Color::Rgb(0, 0, 0),
            panel_bg: Color::Rgb(0, 0, 0),
            panel_alt_bg: Color::Rgb(8, 8, 8),
            border: Color::Rgb(74, 74, 74),
            text: Color::Rgb(242, 242, 242),
            muted: Color::Rgb(150, 150, 150),
            accent: Color::Rgb(212, 212, 212),
            alert: Color::Rgb(235, 176, 97),
            playing: Color::Rgb(178, 195, 220),
            selected_bg: Color::Rgb(26, 26, 26),
            selected_fg: Color::White,
            popup_bg: Color::Rgb(10, 10, 10),
        },
    }
}

pub fn draw(frame: &mut Frame, core: &Core, player: &Player, prompt: Option<&PromptView>) {
    let colors = palette(core.theme);
    frame.render_widget(
        Block::default().style(Style::default().bg(colors.bg)),
        frame.area(),
    );

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(4),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, vertical[0], core, &colors);
    draw_content(frame, vertical[1], core, &colors);
    draw_player_bar(frame, vertical[2], core, player, &colors);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(KEY_HINTS, Style::default().fg(colors.muted)),
        Span::styled("  |  ", Style::default().fg(colors.muted)),
        Span::styled(core.status.as_str(), Style::default().fg(colors.text)),
    ]))
    .block(panel_block(
        "Message",
        colors.panel_bg,
        colors.text,
        colors.border,
    ));
    frame.render_widget(footer, vertical[3]);

    if let Some(prompt) = prompt {
        draw_prompt(frame, prompt, &colors);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, core: &Core, colors: &ThemePalette) {
    let library = core
        .library_root
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| String::from("no folder"));
    let mut spans = vec![
        Span::styled(
            APP_TITLE,
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(library, Style::default().fg(colors.text)),
        Span::styled("  |  ", Style::default().fg(colors.muted)),
        Span::styled(
            format!("Theme {}", core.theme.label()),
            Style::default().fg(colors.alert),
        ),
    ];
    if core.is_scanning() {
        spans.push(Span::styled("  |  ", Style::default().fg(colors.muted)));
        spans.push(Span::styled("scanning", Style::default().fg(colors.muted)));
    }

    let header = Paragraph::new(Line::from(spans)).block(panel_block(
        "Library",
        colors.panel_bg,
        colors.text,
        colors.border,
    ));
    frame.render_widget(header, area);
}

fn content_title(core: &Core) -> String {
    let artist = core.selected_artist().map_or("", |entry| entry.name.as_str());
    let album = core.selected_album().map_or("", |entry| entry.name.as_str());
    match core.view() {
        View::Empty | View::Artists => String::from("Artists"),
        View::Albums => format!("‹ Artists / {artist}"),
        View::Tracks => format!("‹ {artist} / {album}"),
    }
}

fn draw_content(frame: &mut Frame, area: Rect, core: &Core, colors: &ThemePalette) {
    let title = content_title(core);
    let view = core.view();

    if view == View::Empty {
        let message = if core.is_scanning() {
            "Scanning…"
        } else if core.library_root.is_some() {
            "No artists found in this folder. Press o to choose another."
        } else {
            "No music folder open. Press o to choose one."
        };
        let empty = Paragraph::new(Span::styled(message, Style::default().fg(colors.muted)))
            .alignment(Alignment::Center)
            .block(panel_block(
                &title,
                colors.panel_bg,
                colors.text,
                colors.border,
            ));
        frame.render_widget(empty, area);
        return;
    }

    let (entries, cursor) = core.visible();
    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| {
            let playing = view == View::Tracks && core.is_now_playing(entry);
            let marker = if playing { "  > " } else { "    " };
            let (label, style) = if view == View::Tracks {
                let style = if playing {
                    Style::default()
                        .fg(colors.playing)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.text)
                };
                (remove_file_extension(&entry.name), style)
            } else {
                (entry.name.as_str(), Style::default().fg(colors.accent))
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(colors.muted)),
                Span::styled(label, style),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select((!entries.is_empty()).then_some(cursor));

    let list = List::new(items)
        .block(panel_block(
            &title,
            colors.panel_bg,
            colors.text,
            colors.border,
        ))
        .highlight_style(
            Style::default()
                .bg(colors.selected_bg)
                .fg(colors.selected_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("-> ");
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_player_bar(
    frame: &mut Frame,
    area: Rect,
    core: &Core,
    player: &Player,
    colors: &ThemePalette,
) {
    let (title, context) = match &core.now_playing {
        Some(playing) => (
            remove_file_extension(&playing.track.name).to_string(),
            format!("{} • {}", playing.artist, playing.album),
        ),
        None => (String::from("-"), String::new()),
    };
    let state = if !player.has_track() {
        "stopped"
    } else if player.is_playing() {
        "playing"
    } else {
        "paused"
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                title,
                Style::default()
                    .fg(colors.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {context}"), Style::default().fg(colors.muted)),
            Span::styled(format!("  [{state}]"), Style::default().fg(colors.alert)),
        ]),
        Line::from(Span::styled(
            timeline_line(player, 30, 10),
            Style::default().fg(colors.text),
        )),
    ];
    let bar = Paragraph::new(lines).block(panel_block(
        "Now Playing",
        colors.panel_alt_bg,
        colors.text,
        colors.border,
    ));
    frame.render_widget(bar, area);
}

fn panel_block(title: &str, bg: Color, text: Color, border: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(text).add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(bg))
}

fn draw_prompt(frame: &mut Frame, prompt: &PromptView, colors: &ThemePalette) {
    let popup = centered_rect(frame.area(), 60, 5);
    frame.render_widget(Clear, popup);

    let body = vec![
        Line::from(vec![
            Span::styled("> ", Style::default().fg(colors.accent)),
            Span::styled(prompt.input.as_str(), Style::default().fg(colors.text)),
            Span::styled("_", Style::default().fg(colors.muted)),
        ]),
        Line::from(Span::styled(
            prompt.hint.as_str(),
            Style::default().fg(colors.muted),
        )),
    ];
    frame.render_widget(
        Paragraph::new(body).block(panel_block(
            &prompt.title,
            colors.popup_bg,
            colors.text,
            colors.border,
        )),
        popup,
    );
}

fn centered_rect(area: Rect, percent_x: u16, height: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

/// `m:ss`. Anything that is not a finite, non-negative number shows as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return String::from("0:00");
    }
    let total_seconds = seconds.floor() as u64;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes}:{seconds:02}")
}

fn progress_bar(ratio: Option<f64>, width: usize) -> String {
    let clamped = ratio.unwrap_or(0.0).clamp(0.0, 1.0);
    let filled = (clamped * width as f64).round() as usize;
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    bar.push_str(&"#".repeat(filled));
    bar.push_str(&"-".repeat(width.saturating_sub(filled)));
    bar.push(']');
    bar
}

fn timeline_line(player: &Player, timeline_bar_width: usize, volume_bar_width: usize) -> String {
    let elapsed = player.position();
    let total = player.duration();
    let ratio = total.and_then(|total| (total > 0.0).then_some(elapsed / total));

    let volume = player.volume().clamp(0.0, 1.0);
    format!(
        "{} / {} {}  |  Vol {} {:>3}%",
        format_time(elapsed),
        format_time(total.unwrap_or(f64::NAN)),
        progress_bar(ratio, timeline_bar_width),
        progress_bar(Some(f64::from(volume)), volume_bar_width),
        (volume * 100.0).round() as u16
    )
}
