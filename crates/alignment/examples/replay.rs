//! Replay a scripted partial/final event sequence through an alignment
//! session and print the frame after each step.
//!
//!     cargo run -p alignment --example replay -- --step-ms 300

use std::time::{Duration, Instant};

use alignment::{AlignmentSession, HighlightFrame};

const SCRIPT: &str = "먼저 개정 배경에 대해서 알아보도록 하겠습니다. \
한국 증시는 오래전부터 고질적인 저평가 문제를 겪어왔습니다. \
그래서 정부와 국회는 상법 개정을 추진하게 되었습니다.";

enum Event {
    Partial(&'static str),
    Final(&'static str),
    Tick(u64),
}

// loosely follows a real session: growing partials, a finalized utterance,
// a mumbled stretch that only the idle slide can bridge
const EVENTS: &[Event] = &[
    Event::Partial("먼저 개정"),
    Event::Partial("먼저 개정 배경에 대해서"),
    Event::Final("먼저 개정 배경에 대해서 알아보도록 하겠습니다"),
    Event::Partial("한국 증시는"),
    Event::Partial("한국 증시는 오래전부터"),
    Event::Partial("음 그러니까 어"),
    Event::Tick(1000),
    Event::Final("한국 증시는 오래전부터 고질적인 저평가 문제를 겪어왔습니다"),
    Event::Partial("그래서 정부와 국회는"),
    Event::Final("그래서 정부와 국회는 상법 개정을 추진하게 되었습니다"),
];

#[derive(clap::Parser)]
#[command(name = "replay", about = "Replay a transcript event sequence against the demo script")]
struct Args {
    /// Pause between events, in milliseconds (0 = as fast as possible).
    #[arg(short, long, default_value_t = 0)]
    step_ms: u64,
}

fn print_frame(label: &str, frame: &HighlightFrame, reason: &str) {
    println!("== {label} [{reason}] {}%", frame.progress_percent);
    println!("   …{}", tail_of(&frame.before_text, 20));
    println!(" > {}", frame.current_text);
    println!("   {}…", head_of(&frame.after_text, 20));
    println!();
}

fn tail_of(s: &str, n: usize) -> &str {
    let start = s.char_indices().rev().nth(n.saturating_sub(1)).map_or(0, |(i, _)| i);
    &s[start..]
}

fn head_of(s: &str, n: usize) -> &str {
    let end = s.char_indices().nth(n).map_or(s.len(), |(i, _)| i);
    &s[..end]
}

fn main() {
    use clap::Parser;
    let args = Args::parse();
    tracing_subscriber::fmt::init();

    let mut now = Instant::now();
    let mut session = AlignmentSession::new(SCRIPT, now);
    print_frame("start", &session.frame(), "-");

    for event in EVENTS {
        let label = match event {
            Event::Partial(text) => {
                now += Duration::from_millis(300);
                session.apply_partial(text, now);
                format!("partial {text:?}")
            }
            Event::Final(text) => {
                now += Duration::from_millis(300);
                session.apply_final(text, now);
                format!("final   {text:?}")
            }
            Event::Tick(ms) => {
                now += Duration::from_millis(*ms);
                session.tick(now);
                format!("tick   +{ms}ms")
            }
        };
        print_frame(&label, &session.frame(), &session.debug().last_reason);

        if args.step_ms > 0 {
            std::thread::sleep(Duration::from_millis(args.step_ms));
        }
    }

    let skipped = session.skipped_segments();
    if !skipped.is_empty() {
        println!("skipped segments:");
        for s in skipped {
            println!("  - {s}");
        }
    }
}
