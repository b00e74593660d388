use strum_macros::{Display, EnumIter};

/// A simulation variable the bridge subscribes to.
///
/// The declaration order is the order of the values in every data event, so
/// adding a variable changes the payload width and must go together with
/// [`super::TelemetrySnapshot::from_values`].
#[derive(Debug, Display, PartialEq, Eq, Clone, Copy, Hash, EnumIter)]
#[repr(usize)]
pub enum SimVar {
    YokeXPosition,
    YokeYPosition,
    ElevatorTrimPct,
    AileronTrimPct,
    RudderTrimPct,
    FlapsHandleIndex,
    FlapsNumHandlePositions,
    TrailingEdgeFlapsLeftPercent,
    TrailingEdgeFlapsRightPercent,
    ThrottleLeverPosition,
    AirspeedIndicated,
    AirspeedTrue,
    DesignSpeedVc,
    DesignTakeoffSpeed,
    RotationVelocityBodyX,
    RotationVelocityBodyY,
    RotationVelocityBodyZ,
    GForce,
    PropRpm,
    NumberOfEngines,
    GearHandlePosition,
    SimOnGround,
    AutopilotMaster,
    BrakeParkingPosition,
}

impl SimVar {
    /// Name and unit under which the provider knows this variable.
    pub fn definition(self) -> (&'static str, &'static str) {
        match self {
            SimVar::YokeXPosition => ("YOKE X POSITION", "position"),
            SimVar::YokeYPosition => ("YOKE Y POSITION", "position"),
            SimVar::ElevatorTrimPct => ("ELEVATOR TRIM PCT", "percent"),
            SimVar::AileronTrimPct => ("AILERON TRIM PCT", "percent"),
            SimVar::RudderTrimPct => ("RUDDER TRIM PCT", "percent"),
            SimVar::FlapsHandleIndex => ("FLAPS HANDLE INDEX", "number"),
            SimVar::FlapsNumHandlePositions => ("FLAPS NUM HANDLE POSITIONS", "number"),
            SimVar::TrailingEdgeFlapsLeftPercent => ("TRAILING EDGE FLAPS LEFT PERCENT", "percent"),
            SimVar::TrailingEdgeFlapsRightPercent => {
                ("TRAILING EDGE FLAPS RIGHT PERCENT", "percent")
            }
            SimVar::ThrottleLeverPosition => ("GENERAL ENG THROTTLE LEVER POSITION:1", "percent"),
            SimVar::AirspeedIndicated => ("AIRSPEED INDICATED", "knots"),
            SimVar::AirspeedTrue => ("AIRSPEED TRUE", "knots"),
            SimVar::DesignSpeedVc => ("DESIGN SPEED VC", "knots"),
            SimVar::DesignTakeoffSpeed => ("DESIGN TAKEOFF SPEED", "knots"),
            SimVar::RotationVelocityBodyX => ("ROTATION VELOCITY BODY X", "radians per second"),
            SimVar::RotationVelocityBodyY => ("ROTATION VELOCITY BODY Y", "radians per second"),
            SimVar::RotationVelocityBodyZ => ("ROTATION VELOCITY BODY Z", "radians per second"),
            SimVar::GForce => ("G FORCE", "gforce"),
            SimVar::PropRpm => ("PROP RPM:1", "rpm"),
            SimVar::NumberOfEngines => ("NUMBER OF ENGINES", "number"),
            SimVar::GearHandlePosition => ("GEAR HANDLE POSITION", "bool"),
            SimVar::SimOnGround => ("SIM ON GROUND", "bool"),
            SimVar::AutopilotMaster => ("AUTOPILOT MASTER", "bool"),
            SimVar::BrakeParkingPosition => ("BRAKE PARKING POSITION", "bool"),
        }
    }

    /// Position of this variable's value inside a data event payload.
    pub fn index(self) -> usize { self as usize }
}
