use crate::app::App;
use crate::braille::BrailleCanvas;
use crate::legend::{city_legend, country_legend, Corner, Legend, Swatch};
use crate::map::MapLayers;
use crate::palette::hex_to_color;
use crate::scene::Label;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into map area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Node Map ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Braille gives 2x4 resolution per character
    let mut viewport = app.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let layers = app.map_renderer.render(inner.width as usize, inner.height as usize, &viewport);

    let cursor_pos = app.mouse_pixel_pos().and_then(|(px, py)| {
        let cx = (px / 2) as u16;
        let cy = (py / 4) as u16;
        (cx < inner.width && cy < inner.height).then_some((cx, cy))
    });

    frame.render_widget(MapWidget { layers, cursor_pos }, inner);

    if app.map_renderer.settings.show_legends {
        for legend in [city_legend(), country_legend()] {
            render_legend(frame, &legend, inner);
        }
    }

    // Hover label sits to the right of the marker and follows the mouse
    if let (Some(city), Some((cx, cy))) = (app.hovered_city(), cursor_pos) {
        let anchor = (inner.x + cx.saturating_add(2), inner.y + cy.saturating_sub(1));
        render_label(frame, &city.tooltip, anchor, inner, Color::Green);
    }

    if let Some(popup) = &app.popup {
        // Popups open above the clicked point, centered on it
        let width = label_width(&popup.label);
        let x = popup.col.saturating_sub(width / 2);
        let y = popup.row.saturating_sub(4);
        render_label(frame, &popup.label, (x, y), inner, Color::White);
    }
}

/// Custom widget that stacks the braille layers
struct MapWidget {
    layers: MapLayers,
    cursor_pos: Option<(u16, u16)>,
}

/// How a layer's color combines with a cell already drawn below it
#[derive(Clone, Copy, PartialEq, Eq)]
enum Tint {
    /// Layer color wins
    Replace,
    /// Halfway between the color below and the layer color
    Mix,
}

/// Dot pattern of a Braille glyph, `None` for anything else
fn braille_bits(symbol: &str) -> Option<u8> {
    let code = symbol.chars().next()? as u32;
    (0x2800..=0x28FF).contains(&code).then(|| (code - 0x2800) as u8)
}

fn mix(below: Color, above: Color) -> Color {
    match (below, above) {
        (Color::Rgb(r0, g0, b0), Color::Rgb(r1, g1, b1)) => {
            let avg = |a: u8, b: u8| ((a as u16 + b as u16) / 2) as u8;
            Color::Rgb(avg(r0, r1), avg(g0, g1), avg(b0, b1))
        }
        _ => above,
    }
}

impl MapWidget {
    /// Draw every non-blank cell of a canvas over what is already in `buf`.
    /// Dots are merged with a Braille glyph below; `default` stands in for a
    /// missing cell color.
    fn render_layer(canvas: &BrailleCanvas, default: Color, tint: Tint, area: Rect, buf: &mut Buffer) {
        for row in 0..area.height {
            for col in 0..area.width {
                let Some((ch, color)) = canvas.cell(col as usize, row as usize) else {
                    continue;
                };
                let cell = &mut buf[(area.x + col, area.y + row)];
                let color = color.unwrap_or(default);

                let (glyph, fg) = match braille_bits(cell.symbol()) {
                    Some(below) => {
                        let bits = below | (ch as u32 - 0x2800) as u8;
                        let glyph = char::from_u32(0x2800 + bits as u32).unwrap_or(ch);
                        let fg = match tint {
                            Tint::Mix => mix(cell.fg, color),
                            Tint::Replace => color,
                        };
                        (glyph, fg)
                    }
                    None => (ch, color),
                };
                cell.set_char(glyph).set_fg(fg);
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front: country fills, outlines, then city markers on top.
        // Outlines keep a shade of the fill they cross.
        Self::render_layer(&self.layers.fills, Color::Gray, Tint::Replace, area, buf);
        Self::render_layer(&self.layers.outlines, Color::White, Tint::Mix, area, buf);
        Self::render_layer(&self.layers.cities, Color::Green, Tint::Replace, area, buf);

        if let Some((cx, cy)) = self.cursor_pos {
            let x = area.x + cx;
            let y = area.y + cy;
            if x < area.x + area.width && y < area.y + area.height {
                buf[(x, y)].set_char('╋').set_fg(Color::Red);
            }
        }
    }
}

fn label_width(label: &Label) -> u16 {
    let text = label.title.chars().count().max(label.body.chars().count());
    text as u16 + 2
}

/// Bordered two-line box at `anchor`, shifted to stay inside `bounds`
fn render_label(frame: &mut Frame, label: &Label, anchor: (u16, u16), bounds: Rect, accent: Color) {
    let width = label_width(label).min(bounds.width);
    let height = 4.min(bounds.height);
    let rect = clamp_rect(Rect::new(anchor.0, anchor.1, width, height), bounds);

    let text = vec![
        Line::from(Span::styled(
            label.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(label.body.clone()),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));

    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(text).block(block), rect);
}

fn render_legend(frame: &mut Frame, legend: &Legend, bounds: Rect) {
    let glyph = match legend.swatch {
        Swatch::Square => "■",
        Swatch::Round => "●",
    };

    let mut lines = vec![Line::from(Span::styled(
        legend.title,
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    lines.extend(legend.entries.iter().map(|entry| {
        Line::from(vec![
            Span::styled(glyph, Style::default().fg(hex_to_color(entry.color))),
            Span::raw(" "),
            Span::raw(entry.label.clone()),
        ])
    }));

    let content_width = lines.iter().map(|l| l.width()).max().unwrap_or(0) as u16;
    let width = (content_width + 2).min(bounds.width);
    let height = (lines.len() as u16 + 2).min(bounds.height);

    let x = match legend.corner {
        Corner::BottomLeft => bounds.x,
        Corner::BottomRight => bounds.right().saturating_sub(width),
    };
    let y = bounds.bottom().saturating_sub(height);
    let rect = Rect::new(x, y, width, height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

/// Move `rect` so it lies within `bounds` (size is assumed to fit)
fn clamp_rect(rect: Rect, bounds: Rect) -> Rect {
    let x = rect.x.clamp(bounds.x, bounds.right().saturating_sub(rect.width).max(bounds.x));
    let y = rect.y.clamp(bounds.y, bounds.bottom().saturating_sub(rect.height).max(bounds.y));
    Rect::new(x, y, rect.width, rect.height)
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.map_renderer.settings;
    let scene = &app.map_renderer.scene;

    let toggle = |on: bool, on_text: &'static str, off_text: &'static str| {
        Span::styled(
            if on { on_text } else { off_text },
            Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
        )
    };

    let status = Line::from(vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{} countries, {} cities ", scene.countries.len(), scene.cities.len()),
            Style::default().fg(Color::Magenta),
        ),
        toggle(settings.show_outlines, "[B]order ", "[b]order "),
        toggle(settings.show_cities, "[C]ities ", "[c]ities "),
        toggle(settings.show_legends, "[G]legend ", "[g]legend "),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(
            " | hjkl:pan +/-:zoom click:info r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}
