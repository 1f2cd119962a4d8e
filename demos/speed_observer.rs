//! Runs the adaptive speed observer against the reference motor and records
//! every tick to `speed_observer.mcap` as CBOR messages.

use std::{collections::BTreeMap, fs::File, io::BufWriter, sync::Arc};

use im_observer::{
    AdaptiveSpeedObserver, FieldOrientation, InductionMotorModel, MotorConstants, OutputLimits,
    ParameterSet,
};
use anyhow::Context;
use serde::Serialize;

#[derive(Serialize)]
struct Values {
    time_ns: u64,
    true_speed: f32,
    estimated_speed: f32,
    residual: f32,
    current: [f32; 2],
    voltage: [f32; 2],
    true_flux: [f32; 2],
    estimated_flux: [f32; 2],
    flux_angle: f32,
    flux_magnitude: f32,
    stator_back_emf: [f32; 2],
    rotor_back_emf: [f32; 2],
    current_dq: [f32; 2],
}

fn main() -> Result<(), anyhow::Error> {
    let constants = MotorConstants {
        stator_resistance: 0.5,
        rotor_resistance: 0.8,
        stator_inductance: 0.0435,
        rotor_inductance: 0.0435,
        magnetizing_inductance: 0.041,
        pole_pairs: 2.,
        sample_period: 1e-4,
    };
    let params = ParameterSet::validated(constants)?;
    let true_speed = 150.;
    let motor = InductionMotorModel::new(constants, true_speed, 20., 8.);
    let mut observer =
        AdaptiveSpeedObserver::with_pi(&params, 0.2, 200., OutputLimits::symmetric(400.));

    let mut writer = mcap::Writer::new(BufWriter::new(File::create("speed_observer.mcap")?))?;
    let my_channel = mcap::Channel {
        topic: String::from("im_observer"),
        schema: Some(Arc::new(mcap::Schema {
            name: "".to_owned(),
            encoding: "".to_owned(),
            data: std::borrow::Cow::default(),
        })),
        message_encoding: "cbor".to_owned(),
        metadata: BTreeMap::default(),
    };
    let channel_id = writer.add_channel(&my_channel)?;

    let dt_ns = (params.sample_period() * 1e9) as u64;
    for tick in 0..5_000u32 {
        let time_ns = u64::from(tick) * dt_ns;
        let sample = motor.sample(tick);

        let estimated_speed = observer.update(&params, sample.current, sample.voltage);
        let position = observer.flux_position();
        let current_dq = FieldOrientation::from_position(position)
            .with_context(|| format!("non-finite flux angle at tick {tick}"))?
            .to_rotating(sample.current);

        let estimated_flux = observer.flux();
        let stator_back_emf = observer.stator_back_emf();
        let rotor_back_emf = observer.rotor_back_emf();

        // Write to file
        let mut buffer = Vec::with_capacity(256);
        ciborium::into_writer(
            &Values {
                time_ns,
                true_speed,
                estimated_speed,
                residual: observer.residual(),
                current: [sample.current.alpha, sample.current.beta],
                voltage: [sample.voltage.alpha, sample.voltage.beta],
                true_flux: [sample.flux.alpha, sample.flux.beta],
                estimated_flux: [estimated_flux.alpha, estimated_flux.beta],
                flux_angle: position.angle,
                flux_magnitude: position.magnitude,
                stator_back_emf: [stator_back_emf.alpha, stator_back_emf.beta],
                rotor_back_emf: [rotor_back_emf.alpha, rotor_back_emf.beta],
                current_dq: [current_dq.d, current_dq.q],
            },
            &mut buffer,
        )?;
        writer.write_to_known_channel(
            &mcap::records::MessageHeader {
                channel_id,
                sequence: tick,
                log_time: time_ns,
                publish_time: time_ns,
            },
            &buffer,
        )?;
    }

    writer.finish()?;

    println!(
        "estimated {:.2} rad/s electrical ({:.1} rpm) against {:.2} rad/s",
        observer.speed(),
        params.mechanical_rpm(observer.speed()),
        true_speed
    );

    Ok(())
}
