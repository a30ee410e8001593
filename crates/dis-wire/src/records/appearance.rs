//! Entity appearance (32-bit field)
//!
//! The same bit range means different things for different parts of the
//! entity taxonomy: bits 9..11 are the hatch state of a land platform and the
//! canopy state of an air platform. `EntityAppearance` stores the raw value
//! and exposes only the bits every taxonomy agrees on. Taxonomy-specific
//! accessors live on view types (`LandPlatformAppearance`,
//! `AirPlatformAppearance`, ...) over the same integer; the caller picks the
//! view matching the entity's type, optionally through `AppearanceFamily::of`.
//!
//! Each accessor masks and ors only its own bit range.

use bytes::BufMut;

use dis_core::{dis_enum, DisResult, EntityKind, PlatformDomain};

use crate::{DisReader, EntityType, Record};

/// Value storable in an appearance bit range
pub trait BitValue: Sized {
    fn from_bits(bits: u32) -> Self;
    fn into_bits(self) -> u32;
}

impl BitValue for bool {
    #[inline]
    fn from_bits(bits: u32) -> Self {
        bits != 0
    }

    #[inline]
    fn into_bits(self) -> u32 {
        self as u32
    }
}

impl BitValue for u8 {
    #[inline]
    fn from_bits(bits: u32) -> Self {
        bits as u8
    }

    #[inline]
    fn into_bits(self) -> u32 {
        self as u32
    }
}

macro_rules! bit_value_enum {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl BitValue for $ty {
                #[inline]
                fn from_bits(bits: u32) -> Self {
                    <$ty>::from_raw(bits as u8)
                }

                #[inline]
                fn into_bits(self) -> u32 {
                    self.to_raw() as u32
                }
            }
        )+
    };
}

/// Raw access to a 32-bit appearance value
pub trait AppearanceBits {
    fn raw(&self) -> u32;
    fn raw_mut(&mut self) -> &mut u32;

    /// Read `width` bits starting at bit `shift`
    #[inline]
    fn field(&self, shift: u32, width: u32) -> u32 {
        (self.raw() >> shift) & mask(width)
    }

    /// Replace `width` bits starting at bit `shift`; extra value bits are dropped
    #[inline]
    fn set_field(&mut self, shift: u32, width: u32, value: u32) {
        let m = mask(width) << shift;
        let raw = self.raw_mut();
        *raw = (*raw & !m) | ((value << shift) & m);
    }
}

#[inline]
const fn mask(width: u32) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1u32 << width) - 1
    }
}

macro_rules! bit_fields {
    ($(
        $(#[$doc:meta])*
        $get:ident / $set:ident : $ty:ty = [$shift:literal; $width:literal];
    )*) => {
        $(
            $(#[$doc])*
            #[inline]
            pub fn $get(&self) -> $ty {
                <$ty as BitValue>::from_bits(AppearanceBits::field(self, $shift, $width))
            }

            #[inline]
            pub fn $set(&mut self, value: $ty) {
                AppearanceBits::set_field(self, $shift, $width, BitValue::into_bits(value));
            }
        )*
    };
}

macro_rules! appearance_view {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub u32);

        impl AppearanceBits for $name {
            #[inline]
            fn raw(&self) -> u32 {
                self.0
            }

            #[inline]
            fn raw_mut(&mut self) -> &mut u32 {
                &mut self.0
            }
        }

        impl AppearanceView for $name {
            #[inline]
            fn from_appearance(appearance: EntityAppearance) -> Self {
                $name(appearance.0)
            }
        }

        impl From<EntityAppearance> for $name {
            fn from(appearance: EntityAppearance) -> Self {
                $name(appearance.0)
            }
        }

        impl From<$name> for EntityAppearance {
            fn from(view: $name) -> Self {
                EntityAppearance(view.0)
            }
        }
    };
}

/// A taxonomy-specific interpretation of an appearance value
pub trait AppearanceView: AppearanceBits + Copy {
    fn from_appearance(appearance: EntityAppearance) -> Self;
}

dis_enum! {
    #[derive(Default)]
    pub enum PaintScheme: u8 {
        #[default]
        UniformColor = 0,
        Camouflage = 1,
    }
}

dis_enum! {
    /// Damage (or health, for life forms)
    #[derive(Default)]
    pub enum DamageState: u8 {
        #[default]
        NoDamage = 0,
        SlightDamage = 1,
        ModerateDamage = 2,
        Destroyed = 3,
    }
}

dis_enum! {
    #[derive(Default)]
    pub enum SmokeState: u8 {
        #[default]
        NotSmoking = 0,
        SmokePlumeRising = 1,
        EngineSmoke = 2,
        EngineSmokeAndPlumeRising = 3,
    }
}

dis_enum! {
    /// Size of a trailing effect (dust cloud, contrail, wake)
    #[derive(Default)]
    pub enum TrailSize: u8 {
        #[default]
        None = 0,
        Small = 1,
        Medium = 2,
        Large = 3,
    }
}

dis_enum! {
    /// Principal hatch of a land or subsurface platform
    #[derive(Default)]
    pub enum HatchState: u8 {
        #[default]
        NotApplicable = 0,
        Closed = 1,
        Popped = 2,
        PoppedPersonVisible = 3,
        Open = 4,
        OpenPersonVisible = 5,
    }
}

dis_enum! {
    /// Canopy (or troop door) of an air platform
    #[derive(Default)]
    pub enum CanopyState: u8 {
        #[default]
        NotApplicable = 0,
        SingleClosed = 1,
        FrontAndRearClosed = 2,
        FrontOpen = 3,
        SingleOpen = 4,
        RearOpen = 5,
        FrontAndRearOpen = 6,
    }
}

dis_enum! {
    #[derive(Default)]
    pub enum CamouflageType: u8 {
        #[default]
        Desert = 0,
        Winter = 1,
        Forest = 2,
        Other = 3,
    }
}

dis_enum! {
    #[derive(Default)]
    pub enum LifeFormState: u8 {
        #[default]
        NotSpecified = 0,
        UprightStandingStill = 1,
        UprightWalking = 2,
        UprightRunning = 3,
        Kneeling = 4,
        Prone = 5,
        Crawling = 6,
        Swimming = 7,
        Parachuting = 8,
        Jumping = 9,
        Sitting = 10,
        Squatting = 11,
        Crouching = 12,
        Wading = 13,
        Surrender = 14,
        Detained = 15,
    }
}

dis_enum! {
    #[derive(Default)]
    pub enum WeaponState: u8 {
        #[default]
        NoWeapon = 0,
        Stowed = 1,
        Deployed = 2,
        FiringPosition = 3,
    }
}

bit_value_enum!(
    PaintScheme,
    DamageState,
    SmokeState,
    TrailSize,
    HatchState,
    CanopyState,
    CamouflageType,
    LifeFormState,
    WeaponState,
);

/// Raw 32-bit appearance as carried by the entity state PDU
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct EntityAppearance(pub u32);

impl EntityAppearance {
    pub const WIRE_SIZE: usize = 4;

    #[inline]
    pub fn new(raw: u32) -> Self {
        EntityAppearance(raw)
    }

    /// Interpret through a taxonomy-specific view
    #[inline]
    pub fn view<V: AppearanceView>(self) -> V {
        V::from_appearance(self)
    }

    /// Edit through a taxonomy-specific view and store the result
    pub fn update<V: AppearanceView>(&mut self, edit: impl FnOnce(&mut V)) {
        let mut view = V::from_appearance(*self);
        edit(&mut view);
        self.0 = view.raw();
    }

    bit_fields! {
        paint_scheme / set_paint_scheme: PaintScheme = [0; 1];
        damage / set_damage: DamageState = [3; 2];
        is_frozen / set_frozen: bool = [21; 1];
        /// Set when the entity has been removed from the exercise
        is_deactivated / set_deactivated: bool = [23; 1];
    }
}

impl AppearanceBits for EntityAppearance {
    #[inline]
    fn raw(&self) -> u32 {
        self.0
    }

    #[inline]
    fn raw_mut(&mut self) -> &mut u32 {
        &mut self.0
    }
}

impl Record for EntityAppearance {
    fn wire_size(&self) -> usize {
        Self::WIRE_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u32(self.0);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        Ok(EntityAppearance(src.read_u32()?))
    }
}

appearance_view!(
    /// Appearance of a land platform (kind 1, domain 1)
    LandPlatformAppearance
);

impl LandPlatformAppearance {
    bit_fields! {
        paint_scheme / set_paint_scheme: PaintScheme = [0; 1];
        is_mobility_killed / set_mobility_killed: bool = [1; 1];
        is_firepower_killed / set_firepower_killed: bool = [2; 1];
        damage / set_damage: DamageState = [3; 2];
        smoke / set_smoke: SmokeState = [5; 2];
        trailing_dust / set_trailing_dust: TrailSize = [7; 2];
        hatch / set_hatch: HatchState = [9; 3];
        head_lights / set_head_lights: bool = [12; 1];
        tail_lights / set_tail_lights: bool = [13; 1];
        brake_lights / set_brake_lights: bool = [14; 1];
        is_flaming / set_flaming: bool = [15; 1];
        launcher_raised / set_launcher_raised: bool = [16; 1];
        camouflage_type / set_camouflage_type: CamouflageType = [17; 2];
        is_concealed / set_concealed: bool = [19; 1];
        is_frozen / set_frozen: bool = [21; 1];
        power_plant_on / set_power_plant_on: bool = [22; 1];
        is_deactivated / set_deactivated: bool = [23; 1];
        tent_extended / set_tent_extended: bool = [24; 1];
        ramp_down / set_ramp_down: bool = [25; 1];
        blackout_lights / set_blackout_lights: bool = [26; 1];
        blackout_brake_lights / set_blackout_brake_lights: bool = [27; 1];
        spot_lights / set_spot_lights: bool = [28; 1];
        interior_lights / set_interior_lights: bool = [29; 1];
        has_surrendered / set_surrendered: bool = [30; 1];
        is_masked / set_masked: bool = [31; 1];
    }
}

appearance_view!(
    /// Appearance of an air platform (kind 1, domain 2)
    AirPlatformAppearance
);

impl AirPlatformAppearance {
    bit_fields! {
        paint_scheme / set_paint_scheme: PaintScheme = [0; 1];
        is_propulsion_killed / set_propulsion_killed: bool = [1; 1];
        nvg_mode / set_nvg_mode: bool = [2; 1];
        damage / set_damage: DamageState = [3; 2];
        smoke / set_smoke: SmokeState = [5; 2];
        trailing_effects / set_trailing_effects: TrailSize = [7; 2];
        canopy / set_canopy: CanopyState = [9; 3];
        landing_lights / set_landing_lights: bool = [12; 1];
        navigation_lights / set_navigation_lights: bool = [13; 1];
        anti_collision_lights / set_anti_collision_lights: bool = [14; 1];
        is_flaming / set_flaming: bool = [15; 1];
        afterburner_on / set_afterburner_on: bool = [16; 1];
        lower_anti_collision_light / set_lower_anti_collision_light: bool = [17; 1];
        upper_anti_collision_light / set_upper_anti_collision_light: bool = [18; 1];
        anti_collision_night_mode / set_anti_collision_night_mode: bool = [19; 1];
        is_blinking / set_blinking: bool = [20; 1];
        is_frozen / set_frozen: bool = [21; 1];
        power_plant_on / set_power_plant_on: bool = [22; 1];
        is_deactivated / set_deactivated: bool = [23; 1];
        formation_lights / set_formation_lights: bool = [24; 1];
        landing_gear_extended / set_landing_gear_extended: bool = [25; 1];
        cargo_doors_open / set_cargo_doors_open: bool = [26; 1];
        navigation_lights_bright / set_navigation_lights_bright: bool = [27; 1];
        spot_lights / set_spot_lights: bool = [28; 1];
        interior_lights / set_interior_lights: bool = [29; 1];
        reverse_thrust / set_reverse_thrust: bool = [30; 1];
        weight_on_wheels / set_weight_on_wheels: bool = [31; 1];
    }
}

appearance_view!(
    /// Appearance of a surface platform (kind 1, domain 3)
    SurfacePlatformAppearance
);

impl SurfacePlatformAppearance {
    bit_fields! {
        paint_scheme / set_paint_scheme: PaintScheme = [0; 1];
        is_mobility_killed / set_mobility_killed: bool = [1; 1];
        is_firepower_killed / set_firepower_killed: bool = [2; 1];
        damage / set_damage: DamageState = [3; 2];
        smoke / set_smoke: SmokeState = [5; 2];
        wake_size / set_wake_size: TrailSize = [7; 2];
        running_lights / set_running_lights: bool = [12; 1];
        is_flaming / set_flaming: bool = [15; 1];
        is_frozen / set_frozen: bool = [21; 1];
        power_plant_on / set_power_plant_on: bool = [22; 1];
        is_deactivated / set_deactivated: bool = [23; 1];
        spot_lights / set_spot_lights: bool = [28; 1];
        interior_lights / set_interior_lights: bool = [29; 1];
    }
}

appearance_view!(
    /// Appearance of a subsurface platform (kind 1, domain 4)
    SubsurfacePlatformAppearance
);

impl SubsurfacePlatformAppearance {
    bit_fields! {
        paint_scheme / set_paint_scheme: PaintScheme = [0; 1];
        is_mobility_killed / set_mobility_killed: bool = [1; 1];
        damage / set_damage: DamageState = [3; 2];
        hatch / set_hatch: HatchState = [9; 3];
        running_lights / set_running_lights: bool = [12; 1];
        is_frozen / set_frozen: bool = [21; 1];
        power_plant_on / set_power_plant_on: bool = [22; 1];
        is_deactivated / set_deactivated: bool = [23; 1];
    }
}

appearance_view!(
    /// Appearance of a space platform (kind 1, domain 5)
    SpacePlatformAppearance
);

impl SpacePlatformAppearance {
    bit_fields! {
        paint_scheme / set_paint_scheme: PaintScheme = [0; 1];
        is_mobility_killed / set_mobility_killed: bool = [1; 1];
        damage / set_damage: DamageState = [3; 2];
        smoke / set_smoke: SmokeState = [5; 2];
        is_flaming / set_flaming: bool = [15; 1];
        is_frozen / set_frozen: bool = [21; 1];
        power_plant_on / set_power_plant_on: bool = [22; 1];
        is_deactivated / set_deactivated: bool = [23; 1];
    }
}

appearance_view!(
    /// Appearance of a munition (kind 2)
    MunitionAppearance
);

impl MunitionAppearance {
    bit_fields! {
        damage / set_damage: DamageState = [3; 2];
        smoke / set_smoke: SmokeState = [5; 2];
        trailing_effects / set_trailing_effects: TrailSize = [7; 2];
        is_flaming / set_flaming: bool = [15; 1];
        launch_flash / set_launch_flash: bool = [16; 1];
        is_frozen / set_frozen: bool = [21; 1];
        power_plant_on / set_power_plant_on: bool = [22; 1];
        is_deactivated / set_deactivated: bool = [23; 1];
    }
}

appearance_view!(
    /// Appearance of a life form (kind 3)
    LifeFormAppearance
);

impl LifeFormAppearance {
    bit_fields! {
        paint_scheme / set_paint_scheme: PaintScheme = [0; 1];
        health / set_health: DamageState = [3; 2];
        /// Compliance code (detained, surrendered, hand-to-hand, ...)
        compliance / set_compliance: u8 = [5; 4];
        flash_lights / set_flash_lights: bool = [12; 1];
        state / set_state: LifeFormState = [16; 4];
        is_frozen / set_frozen: bool = [21; 1];
        is_deactivated / set_deactivated: bool = [23; 1];
        primary_weapon / set_primary_weapon: WeaponState = [24; 2];
        secondary_weapon / set_secondary_weapon: WeaponState = [26; 2];
        camouflage_type / set_camouflage_type: CamouflageType = [28; 2];
        concealed_stationary / set_concealed_stationary: bool = [30; 1];
        concealed_movement / set_concealed_movement: bool = [31; 1];
    }
}

/// Which appearance view applies to an entity type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AppearanceFamily {
    LandPlatform,
    AirPlatform,
    SurfacePlatform,
    SubsurfacePlatform,
    SpacePlatform,
    Munition,
    LifeForm,
    /// Environmental, cultural feature, supply, ... : only common bits apply
    Other,
}

impl AppearanceFamily {
    pub fn of(entity_type: &EntityType) -> Self {
        match entity_type.kind {
            EntityKind::Platform => match PlatformDomain::from_raw(entity_type.domain) {
                PlatformDomain::Land => AppearanceFamily::LandPlatform,
                PlatformDomain::Air => AppearanceFamily::AirPlatform,
                PlatformDomain::Surface => AppearanceFamily::SurfacePlatform,
                PlatformDomain::Subsurface => AppearanceFamily::SubsurfacePlatform,
                PlatformDomain::Space => AppearanceFamily::SpacePlatform,
                _ => AppearanceFamily::Other,
            },
            EntityKind::Munition => AppearanceFamily::Munition,
            EntityKind::LifeForm => AppearanceFamily::LifeForm,
            _ => AppearanceFamily::Other,
        }
    }
}
