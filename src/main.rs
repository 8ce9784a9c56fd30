// Headless runner: loads a cartridge, emulates a number of frames and
// persists battery RAM on the way out. Useful for smoke testing ROMs and for
// timing the core without a display attached.
use dmg::error::Error;
use dmg::motherboard::MotherBoard;

fn main() {
    rog::reg("dmg");
    rog::reg("dmg::cartridge");

    let mut rom = String::from("");
    let mut bios = String::from("");
    let mut c_frames = 600u32;
    {
        let mut ap = argparse::ArgumentParser::new();
        ap.set_description("Headless DMG emulator core");
        ap.refer(&mut bios)
            .add_option(&["-b", "--bios"], argparse::Store, "Boot with a 256 byte BIOS image");
        ap.refer(&mut c_frames)
            .add_option(&["-f", "--frames"], argparse::Store, "Number of frames to emulate");
        ap.refer(&mut rom).add_argument("rom", argparse::Store, "Rom name");
        ap.parse_args_or_exit();
    }

    let result = if bios.is_empty() {
        MotherBoard::power_up(&rom)
    } else {
        MotherBoard::power_up_with_bios(&rom, &bios)
    };
    let mut mbrd = match result {
        Ok(mbrd) => mbrd,
        Err(e) => {
            rog::println!("Failed to load {}: {}", rom, e);
            std::process::exit(1);
        }
    };

    rog::println!("Running {} for {} frames", mbrd.romname(), c_frames);
    for _ in 0..c_frames {
        if let Err(e) = mbrd.do_frame() {
            rog::println!("{}", e);
            if let Error::IllegalOpcode { trace, .. } = &e {
                rog::println!("Recently executed addresses:");
                for pc in trace {
                    rog::println!("  0x{:04x}", pc);
                }
            }
            mbrd.flush_sav();
            std::process::exit(1);
        }
    }
    mbrd.flush_sav();
}
