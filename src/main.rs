use clap::Parser;
use kantanplay::{
    cli::Args,
    handle_device_list, logging,
    midi::DefaultMidiEngine,
    ui::{conversion_report, create_playback_progress, performance_info, update_playback_progress},
    Error, MidiConfig, MidiPlayer, Performance, PlaybackState, Result, Sequence, SequenceBuilder,
};
use std::panic;
use std::sync::Arc;
use std::{thread, time::Duration};

const PROGRESS_POLL: Duration = Duration::from_millis(100);

fn main() {
    let args = Args::parse();
    initialize_logging(args.verbose);

    let code = match panic::catch_unwind(|| run(&args)) {
        Ok(Ok(())) => 0,
        Ok(Err(e)) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            1
        }
        Err(_) => {
            log::error!("Unexpected failure, aborting");
            eprintln!("Error: unexpected failure");
            1
        }
    };
    std::process::exit(code);
}

fn initialize_logging(verbose: bool) {
    if let Err(e) = logging::init_logger(verbose) {
        eprintln!("Logger initialization failed: {}", e);
    }
    log::info!("Application starting");
}

fn run(args: &Args) -> Result<()> {
    if args.list_ports {
        list_available_devices(&handle_device_list());
        return Ok(());
    }

    let input = args
        .input
        .as_ref()
        .ok_or_else(|| Error::InvalidInput("no input file given".to_string()))?;
    let performance = Performance::from_file(input)?;
    println!("Loaded {}", input.display());

    for advisory in performance.advisories() {
        println!("Warning: {}", advisory);
    }
    if args.verbose {
        println!("{}", performance_info(&performance));
    }
    if args.validate_only {
        println!("Input file is valid");
        return Ok(());
    }

    let config = MidiConfig::load(&args.config)?;
    let builder = SequenceBuilder::new(&config);
    if args.show_conversion || args.verbose {
        println!("{}", conversion_report(&performance, builder.mapper()));
    }

    let sequence = builder.build(&performance)?;
    if args.verbose {
        println!("{}", sequence.summary());
    }
    println!(
        "Generated {} MIDI events ({:.1}s)",
        sequence.len(),
        sequence.total_duration()
    );

    if args.play {
        play(args, Arc::new(sequence))?;
    }
    Ok(())
}

fn list_available_devices(devices: &[String]) {
    if devices.is_empty() {
        println!("No MIDI output ports available");
        return;
    }
    println!("Available MIDI output ports:");
    for device in devices {
        println!("  - {}", device);
    }
}

fn play(args: &Args, sequence: Arc<Sequence>) -> Result<()> {
    let player = MidiPlayer::new(DefaultMidiEngine::default());
    player.set_channel(args.midi_channel());
    let port = player.connect(args.port.as_deref())?;
    println!("Playing on {} (channel {})", port, args.channel);

    let total = sequence.total_duration();
    player.play(sequence)?;

    let pb = create_playback_progress(total);
    loop {
        let state = player.state();
        if state == PlaybackState::Stopped {
            break;
        }
        update_playback_progress(
            &pb,
            player.current_time(),
            total,
            state == PlaybackState::Paused,
        );
        thread::sleep(PROGRESS_POLL);
    }
    update_playback_progress(&pb, total, total, false);
    pb.finish();

    player.disconnect();
    println!("Playback complete");
    Ok(())
}
