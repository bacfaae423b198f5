//! # Seed Data Generator
//!
//! Populates the store with a demo account and a small route for development.
//!
//! ## Usage
//! ```bash
//! # Seed the Redis instance named by REDIS_URL
//! cargo run -p vending-store --bin seed
//!
//! # Custom account
//! cargo run -p vending-store --bin seed -- --email ana@example.com --password secreto
//!
//! # Explicit Redis URL and key prefix
//! cargo run -p vending-store --bin seed -- --redis redis://localhost:6379 --prefix vending-dev
//! ```
//!
//! ## Generated Data
//! - One account (default `demo@vending.local` / `demo123`)
//! - Two places
//! - A claw machine and a double gumball machine, one at each place
//! - Four weeks of weekly collections per machine
//! - Supply costs for plush toys and gumballs
//!
//! Without a Redis URL the seed runs against memory and everything is
//! discarded on exit, which is only useful as a smoke test.

use std::env;
use vending_core::costing::fill_derived_costs;
use vending_core::{
    generar_id, CostoInsumo, Fecha, Lugar, Maquina, ProductoVendido, Recoleccion, TipoChiclera,
    TipoGranelBola, TipoMaquina, UnidadCompra,
};
use vending_store::{Store, StoreConfig, StoreError};

/// Weekly collections generated per machine.
const SEMANAS: i64 = 4;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut redis_url = env::var("REDIS_URL").ok();
    let mut prefix = env::var("KEY_PREFIX").unwrap_or_else(|_| String::from("vending"));
    let mut email = String::from("demo@vending.local");
    let mut password = String::from("demo123");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--redis" | "-r" => {
                if i + 1 < args.len() {
                    redis_url = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--prefix" | "-p" => {
                if i + 1 < args.len() {
                    prefix = args[i + 1].clone();
                    i += 1;
                }
            }
            "--email" | "-e" => {
                if i + 1 < args.len() {
                    email = args[i + 1].clone();
                    i += 1;
                }
            }
            "--password" => {
                if i + 1 < args.len() {
                    password = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vending Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -r, --redis <URL>      Redis URL (default: $REDIS_URL)");
                println!("  -p, --prefix <NAME>    Key prefix (default: $KEY_PREFIX or vending)");
                println!("  -e, --email <EMAIL>    Demo account email (default: demo@vending.local)");
                println!("      --password <PASS>  Demo account password (default: demo123)");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Vending Seed Data Generator");
    println!("==============================");
    println!("Redis:   {}", redis_url.as_deref().unwrap_or("(none, in-memory)"));
    println!("Prefix:  {}", prefix);
    println!("Account: {}", email);
    println!();

    let mut config = StoreConfig::new().key_prefix(prefix);
    if let Some(url) = redis_url {
        config = config.redis_url(url);
    }
    let store = Store::connect(&config).await;
    println!("✓ Connected ({})", store.backend().as_str());

    let usuario = match store.usuarios().create(&email, "Demo", &password).await {
        Ok(u) => u,
        Err(StoreError::Duplicate { .. }) => {
            println!("⚠ Account {} already exists", email);
            println!("  Skipping seed to avoid duplicates.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    println!("✓ Account created: {}", usuario.id);

    let ahora = Fecha::now();
    let inicio = ahora.menos_dias(SEMANAS * 7 + 3);

    // Places
    let centro = lugar("Plaza Centro", "Av. Principal 100", inicio);
    let terminal = lugar("Terminal de Buses", "Calle 8 #45", inicio);
    for l in [&centro, &terminal] {
        store.lugares().save(&usuario.id, l).await?;
    }
    println!("✓ {} places", 2);

    // Machines
    let mut peluchera = maquina(
        "Peluchera Roja",
        "#e53935",
        TipoMaquina::Peluchera,
        None,
        &centro.id,
        inicio,
    );
    peluchera.costo_maquina = 1500.0;
    peluchera.compartimentos[0].cantidad_actual = 30;
    peluchera.compartimentos[0].tipo_producto = Some("peluche".to_string());

    let mut chiclera = maquina(
        "Chiclera Doble",
        "#1e88e5",
        TipoMaquina::Chiclera,
        Some(TipoChiclera::Doble),
        &terminal.id,
        inicio,
    );
    chiclera.costo_maquina = 400.0;
    chiclera.tipo_producto_chiclera = Some(TipoGranelBola::Bola);
    for comp in &mut chiclera.compartimentos {
        comp.cantidad_actual = 120;
        comp.tipo_producto = Some("chicle".to_string());
        comp.tipo_granel_bola = Some(TipoGranelBola::Bola);
        comp.precio_venta = Some(1.0);
    }

    // Supply costs
    let mut peluches = costo(
        TipoMaquina::Peluchera,
        "Peluches surtidos",
        UnidadCompra::Cajas,
        2.0,
        480.0,
        inicio,
    );
    peluches.kg_por_caja = Some(1.0);
    peluches.unidades_por_kg = Some(24.0);
    peluches.productos_relacionados = vec![format!(
        "{}-{}",
        peluchera.id, peluchera.compartimentos[0].id
    )];

    let mut chicles = costo(
        TipoMaquina::Chiclera,
        "Chicle bola",
        UnidadCompra::Kg,
        5.0,
        150.0,
        inicio,
    );
    chicles.unidades_por_kg = Some(180.0);

    for c in [&mut peluches, &mut chicles] {
        fill_derived_costs(c)?;
        store.costos().save(&usuario.id, c).await?;
    }
    println!("✓ {} supply costs", 2);

    // Weekly collections, oldest first
    let mut generated = 0;
    for semana in (0..SEMANAS).rev() {
        let fecha = ahora.menos_dias(semana * 7 + 1);
        let n = (SEMANAS - semana) as u32;

        let mut r = recoleccion(&peluchera, fecha, 180.0 + 20.0 * n as f64, Some(20.0));
        r.turnos_realizados = Some(90 + 10 * n);
        r.peluches_vendidos = Some(8 + n);
        r.precio_por_turno = Some(2.0);
        r.productos_vendidos = vec![ProductoVendido {
            compartimento_id: peluchera.compartimentos[0].id.clone(),
            cantidad: 8 + n,
            producto_id: String::new(),
            producto_nombre: "Peluche".to_string(),
            ingresos: 0.0,
        }];
        r.completar_derivados();
        store.recolecciones().save(&usuario.id, &r).await?;

        let mut r = recoleccion(&chiclera, fecha, 60.0 + 5.0 * n as f64, None);
        r.productos_vendidos = chiclera
            .compartimentos
            .iter()
            .map(|comp| ProductoVendido {
                compartimento_id: comp.id.clone(),
                cantidad: 30 + n,
                producto_id: String::new(),
                producto_nombre: "Chicle".to_string(),
                ingresos: (30 + n) as f64,
            })
            .collect();
        r.completar_derivados();
        store.recolecciones().save(&usuario.id, &r).await?;

        generated += 2;
    }

    // Last collection sets the reminder clock
    peluchera.fecha_ultima_recoleccion = Some(ahora.menos_dias(1));
    chiclera.fecha_ultima_recoleccion = Some(ahora.menos_dias(6));
    store.maquinas().save(&usuario.id, &peluchera).await?;
    store.maquinas().save(&usuario.id, &chiclera).await?;
    println!("✓ {} machines", 2);
    println!("✓ {} collections", generated);

    println!();
    println!("✓ Seed complete! Log in as {} / {}", email, password);

    Ok(())
}

fn lugar(nombre: &str, direccion: &str, fecha: Fecha) -> Lugar {
    Lugar {
        id: generar_id("lugar"),
        nombre: nombre.to_string(),
        direccion: direccion.to_string(),
        coordenadas: None,
        google_maps_url: None,
        notas: None,
        fecha_creacion: fecha,
    }
}

fn maquina(
    nombre: &str,
    color: &str,
    tipo: TipoMaquina,
    tipo_chiclera: Option<TipoChiclera>,
    lugar_id: &str,
    fecha: Fecha,
) -> Maquina {
    let id = generar_id("maquina");
    Maquina {
        compartimentos: Maquina::default_compartimentos(tipo, tipo_chiclera, &id),
        id,
        nombre: nombre.to_string(),
        color: color.to_string(),
        tipo,
        tipo_chiclera,
        tipo_producto_chiclera: None,
        lugar_id: lugar_id.to_string(),
        costo_maquina: 0.0,
        fecha_instalacion: fecha,
        fecha_ultima_recoleccion: None,
        dias_recoleccion_estimados: 7,
        activa: true,
        notas: None,
        imagen: None,
    }
}

fn recoleccion(maquina: &Maquina, fecha: Fecha, ingresos: f64, comision: Option<f64>) -> Recoleccion {
    Recoleccion {
        id: generar_id("recoleccion"),
        maquina_id: maquina.id.clone(),
        fecha,
        ingresos,
        comision_local: comision,
        ingresos_netos: None,
        productos_vendidos: vec![],
        costos: vec![],
        notas: None,
        turnos_realizados: None,
        peluches_vendidos: None,
        precio_por_turno: None,
        tasa_conversion: None,
    }
}

fn costo(
    tipo: TipoMaquina,
    concepto: &str,
    unidad: UnidadCompra,
    cantidad: f64,
    costo_total: f64,
    fecha: Fecha,
) -> CostoInsumo {
    CostoInsumo {
        id: generar_id("costo"),
        fecha,
        tipo_maquina: tipo,
        concepto: concepto.to_string(),
        cantidad,
        unidad,
        costo_unitario: 0.0,
        costo_total,
        unidades_por_kg: None,
        kg_por_caja: None,
        unidades_por_bolsas: None,
        costo_por_unidad: None,
        proveedor: None,
        notas: None,
        productos_relacionados: vec![],
    }
}
