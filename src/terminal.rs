//! The operator console: a bounded scrollback and a single input line.

use ringbuffer::{AllocRingBuffer, RingBuffer};

use crate::command::{self, Outcome};
use crate::engine::{Config, Engine};
use crate::patch::AliasField;
use crate::session::Session;

pub struct Terminal {
    lines: AllocRingBuffer<String>,
    columns: usize,
    input: String,
    /// Lines scrolled up from the bottom.
    scroll: usize,
}

impl Terminal {
    pub fn new(scrollback: usize, columns: usize) -> Self {
        Self {
            lines: AllocRingBuffer::new(scrollback.max(1)),
            columns: columns.max(8),
            input: String::new(),
            scroll: 0,
        }
    }

    /// Append text, splitting on newlines and wrapping at the column width.
    pub fn println(&mut self, text: &str) {
        for line in text.split('\n') {
            for wrapped in wrap(line, self.columns) {
                self.lines.push(wrapped);
            }
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// The `rows` lines currently in view, oldest first.
    pub fn visible(&self, rows: usize) -> impl Iterator<Item = &str> {
        let len = self.lines.len();
        let scroll = self.scroll.min(len.saturating_sub(rows));
        let end = len - scroll;
        let start = end.saturating_sub(rows);
        self.lines().skip(start).take(end - start)
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = (self.scroll + lines).min(self.lines.len());
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = self.lines.len();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn push_char(&mut self, c: char) {
        if !c.is_control() {
            self.input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    /// Run whatever is in the input line.
    pub fn submit<E: Engine>(&mut self, session: &mut Session<E>) -> Option<Outcome> {
        let line = std::mem::take(&mut self.input);
        self.run_line(session, &line)
    }

    /// Echo `line`, run it and print the result or the error.
    pub fn run_line<E: Engine>(&mut self, session: &mut Session<E>, line: &str) -> Option<Outcome> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        self.scroll = 0;
        self.println("");
        self.println(&format!("$ {}", line));

        match command::execute(session, line) {
            Ok(outcome) => {
                for output in outcome.lines() {
                    self.println(&output);
                }
                Some(outcome)
            }
            Err(err) => {
                log::warn!("Command `{}` failed: {}", line, err);
                self.println(&format!("  ^ err: {}", err));
                None
            }
        }
    }

    pub fn print_banner(&mut self, defaults: &Config) {
        for line in BANNER {
            self.println(line);
        }
        self.println("");
        self.println(&help(defaults));
        self.scroll_to_top();
    }
}

const BANNER: &[&str] = &[
    "    _       _                 ",
    "   / \\__  _(_) __ _ _ __ _   _ ",
    "  / _ \\ \\/ / |/ _` | '__| | | |",
    " / ___ \\  /| | (_| | |  | |_| |",
    "/_/   \\_\\/ |_|\\__,_|_|   \\__, |",
    "                         |___/ ",
    "",
    "Simulation of evolution, powered by a neural network and a genetic algorithm.",
    "",
    "Each triangle is a bird; each bird has an eye, whose eyesight is drawn around it, \
     and a brain that decides where and how fast the bird should be moving.",
    "",
    "Each circle is a piece of food, which birds are meant to find and eat.",
    "",
    "All birds start flying with randomized brains. When a generation ends, the birds \
     that ate the most are reproduced and their offspring start the simulation anew.",
    "",
    "Try running `train` a few times (type `t`, press enter, repeat) to fast-forward \
     and watch the birds get better at finding food.",
];

fn help(defaults: &Config) -> String {
    let mut help = String::from("---- Commands ----\n\n");
    help.push_str("- p / pause\n  Pauses (or resumes) the simulation\n\n");
    help.push_str(&format!(
        "- r / reset [animals={}] [f={}] [...]\n  Starts the simulation from scratch with the given optional parameters:\n\n",
        defaults.world_animals, defaults.world_foods
    ));
    for alias in AliasField::ALL {
        help.push_str(&format!(
            "  * {} / {} (default={}, sets {})\n",
            alias.short(),
            alias.long(),
            alias.get(defaults),
            alias.field()
        ));
    }
    help.push_str("\n  Examples:\n    reset animals=100 foods=100\n    r a=100 f=100\n    r p=3\n\n");
    help.push_str(
        "- t / train [how-many-generations]\n  Fast-forwards one or many generations.\n\n  Examples:\n    train\n    t 5\n\n",
    );
    help.push_str("---- Advanced ----\n\n");
    help.push_str("- `reset` can modify any engine parameter by name:\n\n");
    help.push_str("  * r i:integer_param=123 f:float_param=1.5\n");
    help.push_str("  * r a=200 f=200 f:food_size=0.002\n\n");
    help.push_str("  * r i:ga_reverse=1 f:sim_speed_min=0.003\n    (birds *avoid* food)\n");
    help.push_str("  * r i:brain_neurons=1\n    (single-neuron zombies)\n");
    help.push_str("  * r f:food_size=0.05\n    (big birds)\n");
    help.push_str("  * r f:eye_fov_angle=0.45\n    (narrow field of view)\n\n");
    help.push_str("---- Controls ----\n\n");
    help.push_str("  Up / Down      change simulation speed\n");
    help.push_str("  F5             train one generation and chart it\n");
    help.push_str("  PgUp / PgDn    scroll this terminal\n");
    help.push_str("  Esc            clear the input line\n");
    help.push_str("----");
    help
}

/// Greedy word wrap; words longer than `columns` are split.
fn wrap(line: &str, columns: usize) -> Vec<String> {
    if line.chars().count() <= columns {
        return vec![line.to_string()];
    }

    let indent: String = line.chars().take_while(|c| *c == ' ').collect();
    let mut out = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        loop {
            let used = current.chars().count();
            let needed = if used > 0 {
                used + 1 + word.len()
            } else {
                indent.len() + word.len()
            };
            if needed <= columns {
                if used > 0 {
                    current.push(' ');
                } else {
                    current.push_str(&indent);
                }
                current.extend(word.iter());
                break;
            }
            if used > 0 {
                out.push(std::mem::take(&mut current));
                continue;
            }
            let room = columns.saturating_sub(indent.len()).max(1);
            let rest = word.split_off(room.min(word.len()));
            current.push_str(&indent);
            current.extend(word.iter());
            out.push(std::mem::take(&mut current));
            if rest.is_empty() {
                break;
            }
            word = rest;
        }
    }
    if !current.is_empty() || out.is_empty() {
        out.push(current);
    }
    out
}
