#![deny(unsafe_code)]

use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::{value_parser, Arg, Command};
use messages::Severity;
use mimalloc::MiMalloc;
use processor::Processor;

/// High-performance memory allocator for improved allocation throughput.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> ExitCode {
    let matches = Command::new("tattle")
        .about("Demonstrates serialized multithreaded console diagnostics")
        .arg(
            Arg::new("verbosity")
                .long("verbosity")
                .value_name("LEVEL")
                .default_value("minor-steps")
                .help("quiet, errors, major-steps, minor-steps, or everything"),
        )
        .arg(
            Arg::new("workers")
                .long("workers")
                .value_name("N")
                .default_value("3")
                .value_parser(value_parser!(usize))
                .help("Number of producer threads to spawn"),
        )
        .arg(
            Arg::new("ticks")
                .long("ticks")
                .value_name("N")
                .default_value("20")
                .value_parser(value_parser!(usize))
                .help("Progress ticks each producer emits"),
        )
        .get_matches();

    let level = matches
        .get_one::<String>("verbosity")
        .map_or("minor-steps", String::as_str);
    let verbosity: Severity = match level.parse() {
        Ok(verbosity) => verbosity,
        Err(err) => {
            eprintln!("tattle: {err}: {level:?}");
            return ExitCode::FAILURE;
        }
    };
    let workers = matches.get_one::<usize>("workers").copied().unwrap_or(3);
    let ticks = matches.get_one::<usize>("ticks").copied().unwrap_or(20);

    let processor = match Processor::new(verbosity) {
        Ok(processor) => processor,
        Err(err) => {
            eprintln!("tattle: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut producers = Vec::with_capacity(workers);
    for worker in 0..workers {
        let handle = processor.handle();
        producers.push(thread::spawn(move || {
            let src = handle.register_source(Severity::Everything, format!("Worker_{worker}"));
            handle.submit(src, Severity::MajorSteps, "starting");
            for tick in 0..ticks {
                handle.submit(src, Severity::MinorSteps, "crunching .");
                thread::sleep(Duration::from_millis(25));
                if tick + 1 == ticks / 2 {
                    handle.submit(src, Severity::Everything, "::crunch - halfway");
                }
            }
            handle.submit(src, Severity::Quiet, format!("worker {worker}: {ticks} ticks\n"));
            handle.submit(src, Severity::MajorSteps, "finished");
        }));
    }
    for producer in producers {
        let _ = producer.join();
    }

    processor.wait_idle();
    processor.shutdown();
    ExitCode::SUCCESS
}
