//! Typed motor configurations.
//!
//! [`MotorConfig`] is the read-side view of a program's configuration: the
//! namespaced-or-legacy precedence runs once in [`MotorConfig::resolve`] and
//! consumers match on a variant instead of probing JSON keys.

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{
    gamification::Tier,
    motors::{MotorFields, legacy_keys, lenient, resolve},
    programs::ProgramType,
};

/// Cashback settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CashbackConfig {
    /// Percentage of each purchase credited back (7 means 7%).
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub porcentaje: Option<Decimal>,

    /// Maximum credit per customer per calendar month.
    #[serde(default, deserialize_with = "lenient::whole")]
    pub tope_mensual: Option<u64>,
}

impl CashbackConfig {
    /// Credit earned for a purchase of `amount`, given what the customer has
    /// already earned this month. Fractions are truncated and credits past
    /// `u64::MAX` saturate before the cap applies.
    pub fn cashback_for(&self, amount: u64, earned_this_month: u64) -> u64 {
        let Some(percentage) = self.porcentaje.filter(|pct| pct.is_sign_positive()) else {
            return 0;
        };

        let credit = Decimal::from(amount)
            .checked_mul(percentage)
            .and_then(|gross| gross.checked_div(Decimal::ONE_HUNDRED))
            .and_then(|credit| credit.trunc().to_u64())
            .unwrap_or(u64::MAX);

        match self.tope_mensual {
            Some(cap) => credit.min(cap.saturating_sub(earned_this_month)),
            None => credit,
        }
    }
}

/// Multi-use pass settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MultipaseConfig {
    /// Uses included in one pass.
    #[serde(default, deserialize_with = "lenient::small_whole")]
    pub usos_totales: Option<u32>,

    /// Pass price.
    #[serde(default, deserialize_with = "lenient::whole")]
    pub precio: Option<u64>,

    /// Days a pass stays valid after purchase.
    #[serde(default, deserialize_with = "lenient::small_whole")]
    pub vigencia_dias: Option<u32>,
}

/// Membership settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MembresiaConfig {
    /// Monthly fee.
    #[serde(default, deserialize_with = "lenient::whole")]
    pub precio_mensual: Option<u64>,

    /// Human-readable benefits.
    #[serde(default, deserialize_with = "lenient::texts")]
    pub beneficios: Vec<String>,

    /// Membership duration in days.
    #[serde(default, deserialize_with = "lenient::small_whole")]
    pub duracion_dias: Option<u32>,
}

/// One level of a tiered discount.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiscountLevel {
    /// Customer tier this level applies to.
    pub nivel: Tier,

    /// Discount percentage for the tier.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub porcentaje: Option<Decimal>,
}

/// Tiered discount settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DescuentoConfig {
    /// Discount per customer tier.
    #[serde(default, deserialize_with = "lenient::list")]
    pub niveles: Vec<DiscountLevel>,
}

impl DescuentoConfig {
    /// Discount percentage for a customer in `tier`, if one is configured.
    pub fn percentage_for(&self, tier: Tier) -> Option<Decimal> {
        self.niveles
            .iter()
            .find(|level| level.nivel == tier)
            .and_then(|level| level.porcentaje)
    }
}

/// Coupon settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CuponConfig {
    /// Percentage off.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub descuento_porcentaje: Option<Decimal>,

    /// Fixed amount off.
    #[serde(default, deserialize_with = "lenient::whole")]
    pub descuento_monto: Option<u64>,

    /// Days a coupon stays valid after issue.
    #[serde(default, deserialize_with = "lenient::small_whole")]
    pub vigencia_dias: Option<u32>,
}

/// Gift card settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegaloConfig {
    /// Denominations offered.
    #[serde(default, deserialize_with = "lenient::wholes")]
    pub montos: Vec<u64>,

    /// Days a gift card stays valid.
    #[serde(default, deserialize_with = "lenient::small_whole")]
    pub vigencia_dias: Option<u32>,
}

/// Affiliation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AfiliacionConfig {
    /// Benefit description shown to affiliates.
    #[serde(default, deserialize_with = "lenient::text")]
    pub beneficio: Option<String>,

    /// Whether new affiliates need owner approval.
    #[serde(default, deserialize_with = "lenient::flag")]
    pub requiere_aprobacion: bool,
}

/// Configuration for one program type.
#[derive(Debug, Clone, PartialEq)]
pub enum MotorConfig {
    /// Stamp cards have no tunable fields.
    Sellos,

    /// Cashback.
    Cashback(CashbackConfig),

    /// Multi-use pass.
    Multipase(MultipaseConfig),

    /// Membership.
    Membresia(MembresiaConfig),

    /// Tiered discount.
    Descuento(DescuentoConfig),

    /// Coupon.
    Cupon(CuponConfig),

    /// Gift card.
    Regalo(RegaloConfig),

    /// Affiliation.
    Afiliacion(AfiliacionConfig),
}

impl MotorConfig {
    /// Resolve the effective configuration for `ty` from a raw `config` blob.
    pub fn resolve(raw: &Value, ty: ProgramType) -> Self {
        Self::from_fields(ty, &resolve(raw, ty))
    }

    /// Build a variant from an already-resolved field map.
    pub fn from_fields(ty: ProgramType, fields: &MotorFields) -> Self {
        match ty {
            ProgramType::Sellos => Self::Sellos,
            ProgramType::Cashback => Self::Cashback(typed(fields)),
            ProgramType::Multipase => Self::Multipase(typed(fields)),
            ProgramType::Membresia => Self::Membresia(typed(fields)),
            ProgramType::Descuento => Self::Descuento(typed(fields)),
            ProgramType::Cupon => Self::Cupon(typed(fields)),
            ProgramType::Regalo => Self::Regalo(typed(fields)),
            ProgramType::Afiliacion => Self::Afiliacion(typed(fields)),
        }
    }

    /// Program type this configuration belongs to.
    pub const fn program_type(&self) -> ProgramType {
        match self {
            Self::Sellos => ProgramType::Sellos,
            Self::Cashback(_) => ProgramType::Cashback,
            Self::Multipase(_) => ProgramType::Multipase,
            Self::Membresia(_) => ProgramType::Membresia,
            Self::Descuento(_) => ProgramType::Descuento,
            Self::Cupon(_) => ProgramType::Cupon,
            Self::Regalo(_) => ProgramType::Regalo,
            Self::Afiliacion(_) => ProgramType::Afiliacion,
        }
    }
}

/// Migrate pre-namespace flat fields into a typed configuration.
///
/// Keys outside the whitelist for `ty` are ignored.
pub fn legacy_to_variant(ty: ProgramType, flat: &MotorFields) -> MotorConfig {
    let picked = legacy_keys(ty)
        .iter()
        .filter_map(|key| {
            flat.get(*key)
                .filter(|value| !value.is_null())
                .map(|value| ((*key).to_string(), value.clone()))
        })
        .collect::<Map<_, _>>();

    MotorConfig::from_fields(ty, &picked)
}

fn typed<T>(fields: &MotorFields) -> T
where
    T: DeserializeOwned + Default,
{
    serde_json::from_value(Value::Object(fields.clone())).unwrap_or_default()
}
