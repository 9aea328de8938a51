mod inventory_routes;
mod sessions;
