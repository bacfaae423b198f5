//! # Validation Module
//!
//! Business-rule validation for entities arriving from the web client.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web client forms                                             │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: API request DTOs (validator derive)                          │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Shape rules (lengths, ranges)                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: THIS MODULE                                                  │
//! │  └── Rules on the assembled entity, all failures reported at once      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names in errors use the JSON (camelCase) spelling so the client can
//! highlight the right input.

use crate::error::ValidationError;
use crate::fecha::Fecha;
use crate::types::{CostoInsumo, Lugar, Maquina, Recoleccion};
use crate::MIN_PASSWORD_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Rejects empty or whitespace-only text.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Rejects negative amounts and NaN.
pub fn validate_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    if value.is_nan() || value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Requires a value strictly greater than zero.
pub fn validate_positive(field: &str, value: f64) -> ValidationResult<()> {
    if value.is_nan() || value <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Venue commission must be a percentage.
///
/// ## Example
/// ```rust
/// use vending_core::validation::validate_comision;
///
/// assert!(validate_comision(0.0).is_ok());
/// assert!(validate_comision(100.0).is_ok());
/// assert!(validate_comision(120.0).is_err());
/// ```
pub fn validate_comision(comision: f64) -> ValidationResult<()> {
    if !(0.0..=100.0).contains(&comision) {
        return Err(ValidationError::OutOfRange {
            field: "comisionLocal".to_string(),
            min: 0.0,
            max: 100.0,
        });
    }
    Ok(())
}

/// Parses a client-supplied date, naming `field` on failure.
pub fn parse_fecha(field: &str, raw: &str) -> ValidationResult<Fecha> {
    if raw.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Fecha::parse(raw).ok_or_else(|| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("'{raw}' is not an ISO-8601 date"),
    })
}

/// Minimal email check: something on both sides of a single `@`.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    validate_required("email", email)?;

    let mut parts = email.trim().split('@');
    let ok = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
    );
    if !ok {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like user@domain".to_string(),
        });
    }
    Ok(())
}

pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Collects every failed check instead of stopping at the first.
fn collect(checks: impl IntoIterator<Item = ValidationResult<()>>) -> Result<(), Vec<ValidationError>> {
    let errors: Vec<ValidationError> = checks.into_iter().filter_map(Result::err).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_lugar(lugar: &Lugar) -> Result<(), Vec<ValidationError>> {
    collect([
        validate_required("nombre", &lugar.nombre),
        validate_required("direccion", &lugar.direccion),
    ])
}

/// Validates a machine before it is stored.
///
/// ## Rules
/// - `nombre`, `color`, `lugarId` non-empty
/// - `costoMaquina` ≥ 0
/// - `diasRecoleccionEstimados` ≥ 1
/// - every compartment has an id and capacity ≥ 1
pub fn validate_maquina(maquina: &Maquina) -> Result<(), Vec<ValidationError>> {
    let mut checks = vec![
        validate_required("nombre", &maquina.nombre),
        validate_required("color", &maquina.color),
        validate_required("lugarId", &maquina.lugar_id),
        validate_non_negative("costoMaquina", maquina.costo_maquina),
    ];

    if maquina.dias_recoleccion_estimados < 1 {
        checks.push(Err(ValidationError::MustBePositive {
            field: "diasRecoleccionEstimados".to_string(),
        }));
    }

    for (i, comp) in maquina.compartimentos.iter().enumerate() {
        checks.push(validate_required(&format!("compartimentos[{i}].id"), &comp.id));
        if comp.capacidad < 1 {
            checks.push(Err(ValidationError::MustBePositive {
                field: format!("compartimentos[{i}].capacidad"),
            }));
        }
        if let Some(precio) = comp.precio_venta {
            checks.push(validate_non_negative(
                &format!("compartimentos[{i}].precioVenta"),
                precio,
            ));
        }
    }

    collect(checks)
}

pub fn validate_recoleccion(recoleccion: &Recoleccion) -> Result<(), Vec<ValidationError>> {
    let mut checks = vec![
        validate_required("maquinaId", &recoleccion.maquina_id),
        validate_non_negative("ingresos", recoleccion.ingresos),
    ];

    if let Some(comision) = recoleccion.comision_local {
        checks.push(validate_comision(comision));
    }

    for (i, vendido) in recoleccion.productos_vendidos.iter().enumerate() {
        checks.push(validate_required(
            &format!("productosVendidos[{i}].compartimentoId"),
            &vendido.compartimento_id,
        ));
        checks.push(validate_non_negative(
            &format!("productosVendidos[{i}].ingresos"),
            vendido.ingresos,
        ));
    }

    for (i, costo) in recoleccion.costos.iter().enumerate() {
        checks.push(validate_required(&format!("costos[{i}].concepto"), &costo.concepto));
        checks.push(validate_non_negative(&format!("costos[{i}].monto"), costo.monto));
    }

    if let Some(precio) = recoleccion.precio_por_turno {
        checks.push(validate_non_negative("precioPorTurno", precio));
    }

    collect(checks)
}

pub fn validate_costo(costo: &CostoInsumo) -> Result<(), Vec<ValidationError>> {
    let mut checks = vec![
        validate_required("concepto", &costo.concepto),
        validate_non_negative("cantidad", costo.cantidad),
        validate_non_negative("costoUnitario", costo.costo_unitario),
        validate_non_negative("costoTotal", costo.costo_total),
    ];

    let factores = [
        ("unidadesPorKg", costo.unidades_por_kg),
        ("kgPorCaja", costo.kg_por_caja),
        ("unidadesPorBolsas", costo.unidades_por_bolsas),
        ("costoPorUnidad", costo.costo_por_unidad),
    ];
    for (field, value) in factores {
        if let Some(v) = value {
            checks.push(validate_non_negative(field, v));
        }
    }

    collect(checks)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TipoMaquina, UnidadCompra};

    fn maquina() -> Maquina {
        Maquina {
            id: "m1".to_string(),
            nombre: "Chiclera centro".to_string(),
            color: "Rojo".to_string(),
            tipo: TipoMaquina::Chiclera,
            tipo_chiclera: None,
            tipo_producto_chiclera: None,
            lugar_id: "lugar-1".to_string(),
            compartimentos: Maquina::default_compartimentos(TipoMaquina::Chiclera, None, "m1"),
            costo_maquina: 1500.0,
            fecha_instalacion: Fecha::now(),
            fecha_ultima_recoleccion: None,
            dias_recoleccion_estimados: 7,
            activa: true,
            notas: None,
            imagen: None,
        }
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("nombre", "Osito").is_ok());
        assert!(validate_required("nombre", "").is_err());
        assert!(validate_required("nombre", "   ").is_err());
    }

    #[test]
    fn test_numeric_validators() {
        assert!(validate_non_negative("ingresos", 0.0).is_ok());
        assert!(validate_non_negative("ingresos", -0.01).is_err());
        assert!(validate_non_negative("ingresos", f64::NAN).is_err());

        assert!(validate_positive("unidadesPorKg", 0.5).is_ok());
        assert!(validate_positive("unidadesPorKg", 0.0).is_err());
    }

    #[test]
    fn test_validate_comision() {
        assert!(validate_comision(10.0).is_ok());
        assert!(validate_comision(-1.0).is_err());
        assert!(validate_comision(100.5).is_err());
    }

    #[test]
    fn test_parse_fecha() {
        assert!(parse_fecha("inicio", "2025-03-01").is_ok());
        assert_eq!(
            parse_fecha("inicio", "").unwrap_err(),
            ValidationError::Required {
                field: "inicio".to_string()
            }
        );
        assert!(matches!(
            parse_fecha("fin", "mañana").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
    }

    #[test]
    fn test_validate_email_and_password() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("ana").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@b@c").is_err());

        assert!(validate_password("secreto").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_validate_maquina_collects_all_errors() {
        assert!(validate_maquina(&maquina()).is_ok());

        let mut bad = maquina();
        bad.nombre = String::new();
        bad.lugar_id = String::new();
        bad.dias_recoleccion_estimados = 0;
        bad.compartimentos[0].capacidad = 0;

        let errors = validate_maquina(&bad).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field()).collect();
        assert_eq!(
            fields,
            vec![
                "nombre",
                "lugarId",
                "diasRecoleccionEstimados",
                "compartimentos[0].capacidad"
            ]
        );
    }

    #[test]
    fn test_validate_recoleccion() {
        let mut r: Recoleccion = serde_json::from_value(serde_json::json!({
            "id": "r1",
            "maquinaId": "m1",
            "fecha": "2025-02-01",
            "ingresos": 100.0,
            "comisionLocal": 10.0,
            "costos": [{ "concepto": "Gasolina", "monto": 20.0 }]
        }))
        .unwrap();
        assert!(validate_recoleccion(&r).is_ok());

        r.comision_local = Some(150.0);
        r.costos[0].monto = -5.0;
        let errors = validate_recoleccion(&r).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_validate_costo() {
        let costo = CostoInsumo {
            id: "c1".to_string(),
            fecha: Fecha::now(),
            tipo_maquina: TipoMaquina::Chiclera,
            concepto: String::new(),
            cantidad: 1.0,
            unidad: UnidadCompra::Kg,
            costo_unitario: 50.0,
            costo_total: 50.0,
            unidades_por_kg: Some(-1.0),
            kg_por_caja: None,
            unidades_por_bolsas: None,
            costo_por_unidad: None,
            proveedor: None,
            notas: None,
            productos_relacionados: vec![],
        };
        let fields: Vec<String> = validate_costo(&costo)
            .unwrap_err()
            .iter()
            .map(|e| e.field().to_string())
            .collect();
        assert_eq!(fields, vec!["concepto", "unidadesPorKg"]);
    }
}
