//! Simulate a Load Control shed request end to end: write the request
//! through the property dispatcher, then tick the state machine against a
//! manual clock and print every transition.

use clap::Parser;
use corebac_core::encoding::Writer;
use corebac_core::types::{Date, DateTime, ObjectId, ObjectType, PropertyId, Time};
use corebac_objects::{
    Clock, CommandableOutput, ManualClock, ObjectDatabase, PropertyRef, ShedState,
};

#[derive(Parser, Debug)]
#[command(name = "shedsim", about = "Drive a Load Control object through a shed window")]
struct Args {
    /// Requested shed level (BACnetShedLevel level choice).
    #[arg(long, default_value_t = 2)]
    level: u8,
    /// Minutes from now until the shed window opens.
    #[arg(long, default_value_t = 2)]
    start_offset: u32,
    /// Shed duration in minutes.
    #[arg(long, default_value_t = 5)]
    duration: u32,
    /// Analog Output level before the shed (percent of full load).
    #[arg(long, default_value_t = 100.0)]
    output_level: f32,
    /// Simulated minutes to run.
    #[arg(long, default_value_t = 10)]
    minutes: u32,
}

fn lc(property: PropertyId) -> PropertyRef {
    PropertyRef::new(ObjectId::new(ObjectType::LoadControl, 0), property)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut db = ObjectDatabase::new(1);
    let clock = ManualClock::new(DateTime::new(
        Date::from_ymd(2026, 8, 3),
        Time::new(9, 0, 0, 0),
    ));

    // Seed the output as if normal operation held it at some level.
    db.analog_outputs
        .present_value_set(0, args.output_level, 8)?;

    // Requested level, context tag [1].
    db.write_property(
        lc(PropertyId::RequestedShedLevel),
        None,
        &[0x19, args.level],
    )?;

    // Duration, application unsigned.
    let mut buf = [0u8; 8];
    let mut w = Writer::new(&mut buf);
    corebac_core::encoding::primitives::encode_app_unsigned(&mut w, args.duration as u64)?;
    db.write_property(lc(PropertyId::ShedDuration), None, w.as_written())?;

    // Start time, application Date + Time.
    let start = clock.now().add_minutes(args.start_offset);
    let mut buf = [0u8; 16];
    let mut w = Writer::new(&mut buf);
    corebac_core::value::encode_datetime(&mut w, &start)?;
    db.write_property(lc(PropertyId::StartTime), None, w.as_written())?;

    println!(
        "shed level {} for {} min starting in {} min (output at {:.1}%)",
        args.level, args.duration, args.start_offset, args.output_level
    );

    let mut last_state = ShedState::Inactive;
    for minute in 0..=args.minutes {
        db.tick(&clock);
        if let Some(inst) = db.load_controls.instance(0) {
            if inst.state() != last_state || minute == 0 {
                let output = db.analog_outputs.present_value(0);
                println!(
                    "t+{minute:>3} min  {:?}  requested={:?}  actual={:?}  output={output:.1}%",
                    inst.state(),
                    inst.requested(),
                    inst.actual(),
                );
                last_state = inst.state();
            }
        }
        clock.advance_minutes(1);
    }
    Ok(())
}
