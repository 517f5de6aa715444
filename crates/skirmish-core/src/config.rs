//! Per-actor AI configuration.
//!
//! Every value has a default from [`crate::constants`]. A profile can be
//! loaded from TOML where any missing field falls back to its default.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::PatrolDirection;
use crate::error::{ConfigError, Result};
use crate::types::Layers;

/// Static configuration supplied to every bot at spawn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub detection: DetectionConfig,
    pub combat: CombatConfig,
    pub navigation: NavigationConfig,
    pub vitals: VitalsConfig,
}

/// Perception Engine parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub detection_range: f32,
    /// Replace `detection_range` with `unlimited_detection_range`.
    pub ignore_detection_range: bool,
    pub unlimited_detection_range: f32,
    /// Seconds a target is remembered after it was last seen.
    pub known_target_timeout: f32,
    /// Start every life with the nearest hostile as the known target and never time it out.
    pub auto_random_target: bool,
    /// Detection degrades to range and affiliation when no cast resolves.
    pub see_through_walls: bool,
    /// Layers skipped by the visibility cast.
    pub ignore_layers: Layers,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            detection_range: DETECTION_RANGE,
            ignore_detection_range: false,
            unlimited_detection_range: UNLIMITED_DETECTION_RANGE,
            known_target_timeout: KNOWN_TARGET_TIMEOUT,
            auto_random_target: false,
            see_through_walls: false,
            ignore_layers: DETECTION_IGNORE_LAYERS,
        }
    }
}

impl DetectionConfig {
    /// Range actually used by the scan.
    pub fn effective_range(&self) -> f32 {
        if self.ignore_detection_range {
            self.unlimited_detection_range
        } else {
            self.detection_range
        }
    }
}

/// Combat State Machine and Aim Resolution parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Degrees. Beyond this no aim point is resolved.
    pub aim_max_angle: f32,
    /// Degrees. The aim point may only be fired at inside this cone.
    pub weapon_max_shoot_angle: f32,
    /// Degrees. The weapon only tracks the target inside this cone.
    pub weapon_max_look_angle: f32,
    pub weapon_rotation_speed: f32,
    pub muzzle_max_cast_attempts: u32,
    /// Radius of the random nudge applied to retried aim samples.
    pub aim_jitter: f32,
    pub move_while_shoot: bool,
    /// Seconds between two "stop to aim" settles.
    pub settle_interval: f32,
    pub path_reaching_radius: f32,
    pub patrol_direction: PatrolDirection,
    pub waypoint_search_radius: f32,
    pub waypoint_drift_threshold: f32,
    /// Radius of the navmesh sample around a resampled waypoint.
    pub waypoint_sample_distance: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            aim_max_angle: AIM_MAX_ANGLE,
            weapon_max_shoot_angle: WEAPON_MAX_SHOOT_ANGLE,
            weapon_max_look_angle: WEAPON_MAX_LOOK_ANGLE,
            weapon_rotation_speed: WEAPON_ROTATION_SPEED,
            muzzle_max_cast_attempts: MUZZLE_MAX_CAST_ATTEMPTS,
            aim_jitter: AIM_JITTER,
            move_while_shoot: true,
            settle_interval: SETTLE_INTERVAL,
            path_reaching_radius: PATH_REACHING_RADIUS,
            patrol_direction: PatrolDirection::Forward,
            waypoint_search_radius: WAYPOINT_SEARCH_RADIUS,
            waypoint_drift_threshold: WAYPOINT_DRIFT_THRESHOLD,
            waypoint_sample_distance: NAV_SAMPLE_DISTANCE,
        }
    }
}

/// Navigation Bridge and jump physics parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Yaw slerp rate towards the desired facing.
    pub orientation_speed: f32,
    /// Minimum agent speed counted as moving.
    pub agent_velocity_magnitude: f32,
    /// Planar walking speed.
    pub ground_speed: f32,
    pub gravity: f32,
    pub jump_height: f32,
    /// Seconds after take-off before mid-air obstacle bumps are checked.
    pub delay_obstacle_check: f32,
    pub jump_cooldown: f32,
    pub obstacle_offset_y: f32,
    pub obstacle_cast_length: f32,
    /// Jumps only happen within this distance of the link entry.
    pub off_mesh_link_radius: f32,
    pub surface_under_cast_length: f32,
    pub air_control: f32,
    /// Fraction of planar speed kept after bouncing off an obstacle.
    pub jump_damp: f32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            orientation_speed: ORIENTATION_SPEED,
            agent_velocity_magnitude: AGENT_VELOCITY_MAGNITUDE,
            ground_speed: GROUND_SPEED,
            gravity: GRAVITY,
            jump_height: JUMP_HEIGHT,
            delay_obstacle_check: DELAY_OBSTACLE_CHECK,
            jump_cooldown: JUMP_COOLDOWN,
            obstacle_offset_y: OBSTACLE_OFFSET_Y,
            obstacle_cast_length: OBSTACLE_CAST_LENGTH,
            off_mesh_link_radius: OFF_MESH_LINK_RADIUS,
            surface_under_cast_length: SURFACE_UNDER_CAST_LENGTH,
            air_control: AIR_CONTROL,
            jump_damp: JUMP_DAMP,
        }
    }
}

/// Health and lifecycle parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsConfig {
    pub max_health: f32,
    /// Actors below this height die.
    pub kill_height: f32,
    pub kill_height_poll_interval: f32,
    pub respawn_delay: f32,
    pub invulnerable_time: f32,
    /// Zero disables regeneration.
    pub passive_heal_amount: f32,
    pub passive_heal_interval: f32,
}

impl Default for VitalsConfig {
    fn default() -> Self {
        Self {
            max_health: MAX_HEALTH,
            kill_height: KILL_HEIGHT,
            kill_height_poll_interval: KILL_HEIGHT_POLL_INTERVAL,
            respawn_delay: RESPAWN_DELAY,
            invulnerable_time: INVULNERABLE_TIME,
            passive_heal_amount: PASSIVE_HEAL_AMOUNT,
            passive_heal_interval: PASSIVE_HEAL_INTERVAL,
        }
    }
}

impl AiConfig {
    /// Parse a TOML profile and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AiConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the AI cannot work with.
    pub fn validate(&self) -> Result<()> {
        let d = &self.detection;
        non_negative("detection.detection_range", d.detection_range)?;
        non_negative("detection.unlimited_detection_range", d.unlimited_detection_range)?;
        non_negative("detection.known_target_timeout", d.known_target_timeout)?;

        let c = &self.combat;
        angle("combat.aim_max_angle", c.aim_max_angle)?;
        angle("combat.weapon_max_shoot_angle", c.weapon_max_shoot_angle)?;
        angle("combat.weapon_max_look_angle", c.weapon_max_look_angle)?;
        if c.muzzle_max_cast_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "combat.muzzle_max_cast_attempts",
                reason: "must be at least 1".into(),
            });
        }
        non_negative("combat.aim_jitter", c.aim_jitter)?;
        non_negative("combat.settle_interval", c.settle_interval)?;
        non_negative("combat.path_reaching_radius", c.path_reaching_radius)?;
        non_negative("combat.waypoint_search_radius", c.waypoint_search_radius)?;
        non_negative("combat.waypoint_drift_threshold", c.waypoint_drift_threshold)?;
        non_negative("combat.waypoint_sample_distance", c.waypoint_sample_distance)?;

        let n = &self.navigation;
        non_negative("navigation.orientation_speed", n.orientation_speed)?;
        non_negative("navigation.ground_speed", n.ground_speed)?;
        non_negative("navigation.obstacle_cast_length", n.obstacle_cast_length)?;
        non_negative("navigation.agent_velocity_magnitude", n.agent_velocity_magnitude)?;
        non_negative("navigation.gravity", n.gravity)?;
        non_negative("navigation.jump_height", n.jump_height)?;
        non_negative("navigation.jump_cooldown", n.jump_cooldown)?;
        non_negative("navigation.off_mesh_link_radius", n.off_mesh_link_radius)?;

        let v = &self.vitals;
        positive("vitals.max_health", v.max_health)?;
        non_negative("vitals.respawn_delay", v.respawn_delay)?;
        non_negative("vitals.invulnerable_time", v.invulnerable_time)?;
        non_negative("vitals.passive_heal_amount", v.passive_heal_amount)?;
        positive("vitals.kill_height_poll_interval", v.kill_height_poll_interval)?;
        if v.passive_heal_amount > 0.0 {
            positive("vitals.passive_heal_interval", v.passive_heal_interval)?;
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a non-negative number, got {value}"),
        })
    }
}

fn positive(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be positive, got {value}"),
        })
    }
}

fn angle(field: &'static str, value: f32) -> Result<()> {
    if (0.0..=180.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be within 0..=180 degrees, got {value}"),
        })
    }
}
