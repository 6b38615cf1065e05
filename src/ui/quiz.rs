use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::player::{Player, PlayerBackend, PlayerState};
use crate::quiz::{QuestionController, QuestionState};

const OPTION_LABELS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub fn render<B: PlayerBackend>(frame: &mut Frame, area: Rect, app: &App<B>) {
    let Some(question) = app.current_question() else {
        let waiting = Paragraph::new("No question loaded")
            .alignment(Alignment::Center)
            .fg(Color::Yellow);
        frame.render_widget(waiting, area);
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(5),
        Constraint::Fill(1),
        Constraint::Length(2),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_progress(frame, chunks[0], app);
    render_question_text(frame, chunks[1], &question.item().title);
    render_video(frame, chunks[2], question);
    render_options(frame, chunks[3], question, app.cursor());
    render_feedback(frame, chunks[4], question);
    render_controls(frame, chunks[5], question.state() == QuestionState::Unanswered);
}

fn render_progress<B: PlayerBackend>(frame: &mut Frame, area: Rect, app: &App<B>) {
    let progress = format!(
        "{}/{}",
        app.current_question_number(),
        app.total_questions()
    );
    let widget = Paragraph::new(progress)
        .alignment(Alignment::Right)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .fg(Color::White)
        .bold();
    frame.render_widget(widget, area);
}

fn render_video<P: Player>(frame: &mut Frame, area: Rect, question: &QuestionController<P>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Video ")
        .title_style(Style::default().fg(Color::Cyan))
        .padding(Padding::horizontal(1));

    let Some(player) = question.player() else {
        let reason = question
            .player_error()
            .map_or_else(|| "no player".to_string(), |e| e.to_string());
        let widget = Paragraph::new(format!("Video unavailable ({}). You can still answer.", reason))
            .wrap(Wrap { trim: true })
            .fg(Color::Yellow)
            .block(block);
        frame.render_widget(widget, area);
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);
    let rows = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(inner);

    let reveal = question.item().reveal_timestamp;
    let now = player.current_time();
    let state = question.player_state();
    let state_color = match state {
        PlayerState::Playing => Color::Green,
        PlayerState::Paused => Color::Yellow,
        PlayerState::Ended | PlayerState::Invalid => Color::Red,
        _ => Color::Gray,
    };

    let status = Line::from(vec![
        Span::styled(format!("{:<10}", state.label()), Style::default().fg(state_color).bold()),
        Span::styled(format!("{} ", player.video_id()), Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{:>6.1}s / reveal {:.0}s  x{:.2}", now, reveal, player.playback_rate()),
            Style::default().fg(Color::Gray),
        ),
    ]);
    frame.render_widget(Paragraph::new(status), rows[0]);

    let ratio = if reveal > 0.0 { (now / reveal).clamp(0.0, 1.0) } else { 1.0 };
    let label = match question.pending_pause() {
        Some(pause) => format!("pausing in {:.1}s", pause.remaining().as_secs_f64()),
        None if question.state() == QuestionState::Unanswered && ratio >= 1.0 => {
            "waiting for your answer".to_string()
        }
        None => String::new(),
    };
    let gauge = Gauge::default()
        .ratio(ratio)
        .label(label)
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black));
    frame.render_widget(gauge, rows[1]);
}

fn render_options<P: Player>(
    frame: &mut Frame,
    area: Rect,
    question: &QuestionController<P>,
    cursor: usize,
) {
    let answered = question.state() != QuestionState::Unanswered;
    let selected = question.selection().selected_index();
    let item = question.item();
    let correct = if answered { item.correct_index() } else { None };

    let mut lines: Vec<Line> = Vec::with_capacity(item.options.len() * 2);
    for (index, option) in item.options.iter().enumerate() {
        let is_cursor = !answered && index == cursor;
        let is_selected = selected == Some(index);

        let style = if correct == Some(index) {
            Style::default().fg(Color::Green).bold()
        } else if is_selected {
            Style::default().fg(Color::Red).bold()
        } else if is_cursor {
            Style::default().fg(Color::Cyan).bold()
        } else if answered {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if is_cursor || is_selected { ">" } else { " " };
        let label = OPTION_LABELS.get(index).map_or('?', |b| *b as char);

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{}. ", label), style),
            Span::styled(option.as_str(), style),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_feedback<P: Player>(frame: &mut Frame, area: Rect, question: &QuestionController<P>) {
    let line = match question.is_correct() {
        Some(true) => Line::from(Span::styled(
            "Correct!",
            Style::default().fg(Color::Green).bold(),
        )),
        Some(false) => Line::from(Span::styled(
            "Incorrect",
            Style::default().fg(Color::Red).bold(),
        )),
        None => Line::from(""),
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_controls(frame: &mut Frame, area: Rect, unanswered: bool) {
    let text = if unanswered {
        "j/k navigate  ·  enter select  ·  p play/pause  ·  +/- speed  ·  q quit"
    } else {
        "n next  ·  p play/pause  ·  +/- speed  ·  q quit"
    };
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
