// Criterion benchmarks for the host call shim

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use usedcar_web::models::{Amount, Vehicle};
use usedcar_web::services::vehcrud::{vehicle_data_param, vehicle_from_row, MAX_RESULTS};
use usedcar_web::toolkit::{xml, DataParam, Direction, ParamType, ProcedureCall, StructParam};

fn create_vehicle(id: i64) -> Vehicle {
    Vehicle {
        vehicle_id: id,
        make: "Toyota".to_string(),
        model: "Corolla".to_string(),
        trim: "LE".to_string(),
        year: 2015 + (id % 8) as i32,
        vin: format!("2T1BURHE0FC{:06}", id),
        color: "White".to_string(),
        odometer: 20_000 + id * 37,
        condition_rating: (id % 5 + 1) as i32,
        acquisition_price: Amount::from_cents(900_000 + id * 100),
        asking_price: Amount::from_cents(1_150_000 + id * 100),
        notes: "Clean history report".to_string(),
        ..Vehicle::default()
    }
}

fn list_call() -> ProcedureCall {
    ProcedureCall::new("VEHCRUD", "ListVehicles")
        .param(
            StructParam::new("ResultArray", Direction::Out)
                .dim(MAX_RESULTS)
                .out("VehicleId", ParamType::int())
                .out("Make", ParamType::chars(50))
                .out("Model", ParamType::chars(50))
                .out("Year", ParamType::int())
                .out("AskingPrice", ParamType::packed(10, 2))
                .out("Status", ParamType::chars(10)),
        )
        .param(DataParam::output("ResultCount", ParamType::int()))
}

fn list_reply(rows: usize) -> String {
    let mut xml = String::from("<xmlservice><pgm name='VEHCRUD' lib='USEDCAR' func='ListVehicles'><parm io='out' var='p1'>");
    for i in 0..rows {
        xml.push_str(&format!(
            "<ds var='ResultArray' dim='999'>\
             <data var='VehicleId' type='10i0'>{}</data>\
             <data var='Make' type='50A'>Toyota</data>\
             <data var='Model' type='50A'>Corolla</data>\
             <data var='Year' type='10i0'>2019</data>\
             <data var='AskingPrice' type='10p2'>{}.00</data>\
             <data var='Status' type='10A'>AVAILABLE</data></ds>",
            i + 1,
            10_000 + i
        ));
    }
    xml.push_str(&format!(
        "</parm><parm io='out' var='p2'><data var='ResultCount' type='10i0'>{}</data></parm></pgm></xmlservice>",
        rows
    ));
    xml
}

fn bench_build_request(c: &mut Criterion) {
    let vehicle = create_vehicle(42);

    c.bench_function("build_update_vehicle_request", |b| {
        b.iter(|| {
            let call = ProcedureCall::new("VEHCRUD", "UpdateVehicle")
                .param(vehicle_data_param(black_box(&vehicle), true))
                .param(DataParam::input("UserId", ParamType::chars(10), "WEBUSER"))
                .returns(ParamType::int());
            xml::build_request(&call, "USEDCAR")
        });
    });
}

fn bench_parse_listing(c: &mut Criterion) {
    let call = list_call();
    let mut group = c.benchmark_group("parse_listing");

    for rows in [10usize, 100, 999].iter() {
        let reply = list_reply(*rows);

        group.bench_with_input(BenchmarkId::new("list_vehicles", rows), rows, |b, _| {
            b.iter(|| {
                let output = xml::parse_response(&call, black_box(&reply)).ok();
                let vehicles: Vec<Vehicle> = output
                    .iter()
                    .flat_map(|o| o.values.rows("ResultArray"))
                    .map(vehicle_from_row)
                    .collect();
                black_box(vehicles)
            });
        });
    }

    group.finish();
}

fn bench_amounts(c: &mut Criterion) {
    c.bench_function("amount_parse_and_format", |b| {
        b.iter(|| {
            let amount: Amount = black_box("$15,999.95").parse().unwrap_or_default();
            amount.currency()
        });
    });
}

criterion_group!(benches, bench_build_request, bench_parse_listing, bench_amounts);

criterion_main!(benches);
