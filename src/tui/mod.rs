//! Ratatui-based terminal UI.
//!
//! The TUI shows the predicted curve for the current buffer volume. Moving the
//! buffer control redraws the curve; `c` blanks the chart for exactly one
//! output, after which the next buffer change shows a curve again.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
};
use tracing::info;

use crate::app::controller::{ReactiveController, Render, Trigger};
use crate::app::pipeline::Session;
use crate::domain::{AppConfig, BufferControl, X_LABEL, Y_LABEL};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::CurvePlottersChart;

/// Start the TUI.
///
/// The model is fitted before the terminal is touched, so data errors are
/// reported on a normal screen.
pub fn run(config: AppConfig) -> Result<(), AppError> {
    let session = crate::app::pipeline::initialize(&config)?;
    let mut app = App::new(session, config.buffer);

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Buffer volume control: a value in `[min, max]` snapped to `step`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BufferSlider {
    min: f64,
    max: f64,
    step: f64,
    value: f64,
}

impl BufferSlider {
    fn new(control: BufferControl) -> Self {
        let mut slider = Self {
            min: control.min,
            max: control.max,
            step: control.step,
            value: control.min,
        };
        slider.value = slider.snap(control.initial);
        slider
    }

    fn snap(&self, v: f64) -> f64 {
        let steps = ((v - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }

    /// Move by `steps` increments. Returns the new value only if it changed.
    fn nudge(&mut self, steps: i32) -> Option<f64> {
        self.set(self.value + f64::from(steps) * self.step)
    }

    fn set(&mut self, v: f64) -> Option<f64> {
        let next = self.snap(v);
        if (next - self.value).abs() < self.step * 1e-6 {
            return None;
        }
        self.value = next;
        Some(next)
    }

    /// Position in `[0, 1]` for the gauge.
    fn ratio(&self) -> f64 {
        let span = self.max - self.min;
        if span > 0.0 {
            ((self.value - self.min) / span).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

struct App {
    session: Session,
    controller: ReactiveController,
    slider: BufferSlider,
    render: Render,
    status: String,
}

impl App {
    fn new(session: Session, buffer: BufferControl) -> Self {
        let mut controller = session.controller();
        let slider = BufferSlider::new(buffer);
        // Initial display: the curve at the starting buffer volume.
        let render = controller.handle(Trigger::SliderChanged(slider.value));
        Self {
            session,
            controller,
            slider,
            render,
            status: "Ready.".to_string(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        let moved = match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left | KeyCode::Char('h') => self.slider.nudge(-1),
            KeyCode::Right | KeyCode::Char('l') => self.slider.nudge(1),
            KeyCode::Home => self.slider.set(self.slider.min),
            KeyCode::End => self.slider.set(self.slider.max),
            KeyCode::Char('c') => {
                self.fire(Trigger::ClearPressed);
                return false;
            }
            _ => None,
        };

        if let Some(buffer) = moved {
            self.fire(Trigger::SliderChanged(buffer));
        }
        false
    }

    fn fire(&mut self, trigger: Trigger) {
        self.render = self.controller.handle(trigger);
        self.status = match (&self.render, trigger) {
            (Render::Blank, _) => "Chart cleared.".to_string(),
            (Render::Curve(_), Trigger::SliderChanged(b)) => format!("buffer = {b:.2}"),
            (Render::Curve(_), Trigger::ClearPressed) => String::new(),
        };
        info!(?trigger, blank = matches!(self.render, Render::Blank), "tui trigger");
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
        self.draw_slider(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let model = self.session.model();
        let fit = &self.session.fit;
        let lines = vec![
            Line::from(vec![
                Span::styled("emul", Style::default().fg(Color::Cyan)),
                Span::raw(format!(
                    " | logit P = {:.3} + {:.3}·K3PO4 + {:.3}·buffer",
                    model.intercept(),
                    model.stoichiometry_weight(),
                    model.buffer_weight()
                )),
            ]),
            Line::from(Span::styled(
                format!(
                    "n={} | iterations={} | pseudo R²={:.3}",
                    fit.n_obs,
                    fit.iterations,
                    fit.pseudo_r2()
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let grid = &self.session.grid;
        let x_bounds = [grid.lo(), grid.hi()];

        let (title, curve) = match &self.render {
            Render::Curve(cf) => (format!("{} (buffer={:.2})", cf.title, cf.curve.buffer), cf.curve.xy()),
            Render::Blank => ("(cleared)".to_string(), Vec::new()),
        };

        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let widget = CurvePlottersChart {
            curve: &curve,
            x_bounds,
            y_bounds: [0.0, 1.0],
            x_label: X_LABEL,
            y_label: Y_LABEL,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_slider(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let gauge = Gauge::default()
            .block(Block::default().title("Buffer").borders(Borders::ALL))
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(self.slider.ratio())
            .label(format!(
                "{:.2}  [{:.2} .. {:.2}]",
                self.slider.value, self.slider.min, self.slider.max
            ));
        frame.render_widget(gauge, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ buffer  Home/End min/max  c clear  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DataSource;

    fn control(initial: f64) -> BufferControl {
        BufferControl {
            min: 0.0,
            max: 2.0,
            step: 0.1,
            initial,
        }
    }

    fn app() -> App {
        let config = AppConfig {
            source: DataSource::Synthetic { seed: 5 },
            ..AppConfig::default()
        };
        let session = crate::app::pipeline::initialize(&config).unwrap();
        App::new(session, config.buffer)
    }

    #[test]
    fn slider_snaps_and_clamps_initial_value() {
        assert!((BufferSlider::new(control(1.04)).value - 1.0).abs() < 1e-12);
        assert_eq!(BufferSlider::new(control(7.0)).value, 2.0);
        assert_eq!(BufferSlider::new(control(-1.0)).value, 0.0);
    }

    #[test]
    fn slider_reports_only_real_changes() {
        let mut s = BufferSlider::new(control(2.0));
        assert_eq!(s.nudge(1), None);
        let v = s.nudge(-1).unwrap();
        assert!((v - 1.9).abs() < 1e-9);
        assert!((s.ratio() - 0.95).abs() < 1e-9);
    }

    #[test]
    fn app_starts_with_a_curve() {
        let app = app();
        assert!(matches!(app.render, Render::Curve(_)));
    }

    #[test]
    fn clear_then_move_shows_curve_again() {
        let mut app = app();
        assert!(!app.handle_key(KeyCode::Char('c')));
        assert_eq!(app.render, Render::Blank);

        app.handle_key(KeyCode::Right);
        match &app.render {
            Render::Curve(cf) => assert!((cf.curve.buffer - 1.1).abs() < 1e-9),
            Render::Blank => panic!("expected a curve after moving the buffer"),
        }
    }

    #[test]
    fn moving_past_the_end_keeps_the_current_render() {
        let mut app = app();
        app.handle_key(KeyCode::End);
        app.handle_key(KeyCode::Char('c'));
        // Already at max: no trigger fires, the chart stays blank.
        app.handle_key(KeyCode::Right);
        assert_eq!(app.render, Render::Blank);
    }

    #[test]
    fn quit_keys() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('q')));
        assert!(app.handle_key(KeyCode::Esc));
    }
}
