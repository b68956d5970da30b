use crate::config::DEFAULT_CONFIG_PATH;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Play a scale-degree performance over MIDI", long_about = None)]
pub struct Args {
    /// Performance JSON file
    #[arg(required_unless_present = "list_ports")]
    pub input: Option<PathBuf>,

    /// MIDI lookup table file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Only validate the input file
    #[arg(long)]
    pub validate_only: bool,

    /// Show how the input maps to MIDI notes
    #[arg(long)]
    pub show_conversion: bool,

    /// Play the performance on a MIDI output
    #[arg(long)]
    pub play: bool,

    /// MIDI output port to play on (defaults to the first available)
    #[arg(long)]
    pub port: Option<String>,

    /// MIDI channel, 1-16
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub channel: u8,

    /// List available MIDI output ports
    #[arg(long)]
    pub list_ports: bool,

    /// Show detailed information
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Zero-based channel as used on the wire
    pub fn midi_channel(&self) -> u8 {
        self.channel - 1
    }
}
