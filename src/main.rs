use clap::Parser;
use salvage::main_helper::{
    load_registry, prepare_log_dir, read_input, render, stream_steps, Args,
};
use salvage::stream_parser::{IncrementalParser, StreamParser};

fn run(args: &Args) -> salvage::Result<()> {
    let input = read_input(args.input.as_deref())?;
    let registry = load_registry(args.tools.as_deref())?;
    let parser = StreamParser::new(registry, args.parser_config());

    tracing::debug!(
        "[CLI] {} bytes of input, config {:?}",
        input.len(),
        parser.config()
    );

    if args.incremental {
        let mut incremental = IncrementalParser::new(parser);
        for step in stream_steps(&input) {
            let result = incremental.feed(step);
            println!("{}", render(&result, args.pretty)?);
        }
    } else {
        let result = parser.parse(&input);
        println!("{}", render(&result, args.pretty)?);
    }
    Ok(())
}

fn main() {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    if let Err(e) = prepare_log_dir(args.log_dir.as_deref()) {
        eprintln!("Error: cannot create log directory: {}", e.inner);
        std::process::exit(1);
    }
    let _guard = salvage::logging::init_tracing(args.log_dir.as_deref());

    // Initialize global panic hook
    salvage::logging::setup_panic_hook();

    if let Err(e) = run(&args) {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e.inner);
        std::process::exit(1);
    }
}
