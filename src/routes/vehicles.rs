use crate::models::{PriceAdjustmentForm, StatusForm, VehicleForm, KNOWN_STATUSES};
use crate::routes::AppState;
use crate::services::VEHCRUD_SUCCESS;
use crate::views::FlashMessage;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use tera::Context;

pub fn configure(cfg: &mut web::ServiceConfig) {
    // `/vehicle/add` must win over `/vehicle/{id}`
    cfg.service(
        web::resource("/vehicle/add")
            .route(web::get().to(add_form))
            .route(web::post().to(add_vehicle)),
    )
    .route("/vehicle/{id}", web::get().to(vehicle_detail))
    .service(
        web::resource("/vehicle/{id}/edit")
            .route(web::get().to(edit_form))
            .route(web::post().to(edit_vehicle)),
    )
    .route("/vehicle/{id}/status", web::post().to(update_status))
    .route("/vehicle/{id}/delete", web::post().to(delete_vehicle))
    .route(
        "/vehicle/{id}/price-adjustment",
        web::post().to(price_adjustment),
    );
}

pub fn detail_path(vehicle_id: i64) -> String {
    format!("/vehicle/{}", vehicle_id)
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn not_found_redirect(state: &AppState, vehicle_id: i64) -> HttpResponse {
    state.views.redirect(
        "/inventory",
        vec![FlashMessage::error(format!(
            "Vehicle with ID {} not found",
            vehicle_id
        ))],
    )
}

fn form_page(
    state: &AppState,
    req: &HttpRequest,
    form: &VehicleForm,
    vehicle_id: Option<i64>,
    messages: Vec<FlashMessage>,
) -> HttpResponse {
    let mut context = Context::new();
    context.insert("vehicle", form);
    context.insert("action", if vehicle_id.is_some() { "edit" } else { "add" });
    context.insert("vehicle_id", &vehicle_id);

    state
        .views
        .page_with(req, "vehicle_form.html", context, messages, StatusCode::OK)
}

/// Vehicle detail page
///
/// GET /vehicle/{id}
async fn vehicle_detail(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    req: HttpRequest,
) -> HttpResponse {
    let vehicle_id = path.into_inner();

    let Some(vehicle) = state.connector.get_vehicle_by_id(vehicle_id).await else {
        return not_found_redirect(&state, vehicle_id);
    };

    let history = state.connector.get_vehicle_history(vehicle_id).await;
    let days_in_inventory = state.connector.calculate_days_in_inventory(vehicle_id).await;

    let mut context = Context::new();
    if vehicle.is_sold() {
        let profit = state.connector.calculate_vehicle_profit(vehicle_id).await;
        let days_to_sell = state.connector.calculate_days_to_sell(vehicle_id).await;
        context.insert("profit", &profit);
        context.insert("days_to_sell", &days_to_sell);
    }

    context.insert("title", &vehicle.title());
    context.insert("vehicle", &vehicle);
    context.insert("history", &history);
    context.insert("days_in_inventory", &days_in_inventory);
    context.insert("statuses", KNOWN_STATUSES);

    state.views.page(&req, "vehicle_detail.html", context)
}

/// GET /vehicle/add
async fn add_form(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    form_page(&state, &req, &VehicleForm::default(), None, Vec::new())
}

/// POST /vehicle/add
async fn add_vehicle(
    state: web::Data<AppState>,
    form: web::Form<VehicleForm>,
    req: HttpRequest,
) -> HttpResponse {
    let form = form.into_inner();

    let vehicle = match form.to_new_vehicle(today()) {
        Ok(vehicle) => vehicle,
        Err(e) => {
            tracing::info!("Rejected new vehicle: {}", e);
            let message = FlashMessage::error(format!("Error adding vehicle: {}", e));
            return form_page(&state, &req, &form, None, vec![message]);
        }
    };

    let vehicle_id = state.connector.add_vehicle(&vehicle, &state.user_id).await;
    if vehicle_id > 0 {
        tracing::info!("Added vehicle {} ({})", vehicle_id, vehicle.title());
        state.views.redirect(
            &detail_path(vehicle_id),
            vec![FlashMessage::success(format!(
                "Vehicle added successfully with ID: {}",
                vehicle_id
            ))],
        )
    } else {
        tracing::warn!("AddVehicle returned {}", vehicle_id);
        let message = FlashMessage::error("Failed to add vehicle");
        form_page(&state, &req, &form, None, vec![message])
    }
}

/// GET /vehicle/{id}/edit
async fn edit_form(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    req: HttpRequest,
) -> HttpResponse {
    let vehicle_id = path.into_inner();

    match state.connector.get_vehicle_by_id(vehicle_id).await {
        Some(vehicle) => form_page(
            &state,
            &req,
            &VehicleForm::from(&vehicle),
            Some(vehicle_id),
            Vec::new(),
        ),
        None => not_found_redirect(&state, vehicle_id),
    }
}

/// POST /vehicle/{id}/edit
async fn edit_vehicle(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    form: web::Form<VehicleForm>,
    req: HttpRequest,
) -> HttpResponse {
    let vehicle_id = path.into_inner();
    let form = form.into_inner();

    let Some(mut vehicle) = state.connector.get_vehicle_by_id(vehicle_id).await else {
        return not_found_redirect(&state, vehicle_id);
    };

    if let Err(e) = form.apply_to(&mut vehicle) {
        tracing::info!("Rejected update of vehicle {}: {}", vehicle_id, e);
        let message = FlashMessage::error(format!("Error updating vehicle: {}", e));
        return form_page(&state, &req, &form, Some(vehicle_id), vec![message]);
    }

    let result = state.connector.update_vehicle(&vehicle, &state.user_id).await;
    if result == VEHCRUD_SUCCESS {
        state.views.redirect(
            &detail_path(vehicle_id),
            vec![FlashMessage::success("Vehicle updated successfully")],
        )
    } else {
        tracing::warn!("UpdateVehicle({}) returned {}", vehicle_id, result);
        let message = FlashMessage::error("Failed to update vehicle");
        form_page(&state, &req, &form, Some(vehicle_id), vec![message])
    }
}

/// POST /vehicle/{id}/status
async fn update_status(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    form: web::Form<StatusForm>,
) -> HttpResponse {
    let vehicle_id = path.into_inner();

    let message = match form.resolve(today()) {
        Ok((status, date_sold)) => {
            let result = state
                .connector
                .update_vehicle_status(vehicle_id, &status, date_sold, &state.user_id, &form.notes)
                .await;

            if result == VEHCRUD_SUCCESS {
                tracing::info!("Vehicle {} is now {}", vehicle_id, status);
                FlashMessage::success("Vehicle status updated successfully")
            } else {
                tracing::warn!("UpdateVehicleStatus({}) returned {}", vehicle_id, result);
                FlashMessage::error("Failed to update vehicle status")
            }
        }
        Err(e) => FlashMessage::error(format!("Error updating vehicle status: {}", e)),
    };

    state.views.redirect(&detail_path(vehicle_id), vec![message])
}

/// POST /vehicle/{id}/delete
async fn delete_vehicle(state: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
    let vehicle_id = path.into_inner();

    let result = state.connector.delete_vehicle(vehicle_id, &state.user_id).await;
    if result == VEHCRUD_SUCCESS {
        tracing::info!("Deleted vehicle {}", vehicle_id);
        state.views.redirect(
            "/inventory",
            vec![FlashMessage::success(format!(
                "Vehicle {} deleted",
                vehicle_id
            ))],
        )
    } else {
        tracing::warn!("DeleteVehicle({}) returned {}", vehicle_id, result);
        state.views.redirect(
            &detail_path(vehicle_id),
            vec![FlashMessage::error("Failed to delete vehicle")],
        )
    }
}

/// Preview or apply a price adjustment to one vehicle
///
/// POST /vehicle/{id}/price-adjustment
async fn price_adjustment(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    form: web::Form<PriceAdjustmentForm>,
) -> HttpResponse {
    let vehicle_id = path.into_inner();

    let message = match form.parse() {
        Ok((days, percentage)) if form.is_preview() => {
            let price = state
                .connector
                .calculate_price_adjustment(vehicle_id, days, percentage)
                .await;
            FlashMessage::info(format!(
                "Adjusted price would be {} ({}% after {} days)",
                price.currency(),
                percentage,
                days
            ))
        }
        Ok((days, percentage)) => {
            let result = state
                .connector
                .apply_price_adjustment(vehicle_id, days, percentage, &state.user_id)
                .await;
            if result == VEHCRUD_SUCCESS {
                FlashMessage::success("Price adjustment applied")
            } else {
                tracing::warn!("ApplyPriceAdjustment({}) returned {}", vehicle_id, result);
                FlashMessage::error("Failed to apply price adjustment")
            }
        }
        Err(e) => FlashMessage::error(format!("Error adjusting price: {}", e)),
    };

    state.views.redirect(&detail_path(vehicle_id), vec![message])
}
