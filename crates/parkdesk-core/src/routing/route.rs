use std::fmt;

/// Which side of the auth gate a route lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// Reachable only while signed out.
    Public,
    /// Reachable only while signed in.
    Protected,
    /// Reachable in any state.
    Shared,
}

/// Screens of the admin client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Loading,
    Login,
    Signup,
    Dashboard,
    Bookings,
    ParkingAreas,
    AddArea,
    EditArea { area_id: String },
    ManageSlots,
    OccupancyReport,
    RevenueReport,
    Profile,
    NotFound,
}

impl Route {
    /// Root of the protected partition.
    pub const PROTECTED_ROOT: Route = Route::Dashboard;

    /// Root of the public partition.
    pub const PUBLIC_AUTH_ROOT: Route = Route::Login;

    pub fn partition(&self) -> Partition {
        match self {
            Route::Loading | Route::NotFound => Partition::Shared,
            Route::Login | Route::Signup => Partition::Public,
            Route::Dashboard
            | Route::Bookings
            | Route::ParkingAreas
            | Route::AddArea
            | Route::EditArea { .. }
            | Route::ManageSlots
            | Route::OccupancyReport
            | Route::RevenueReport
            | Route::Profile => Partition::Protected,
        }
    }

    pub fn requires_auth(&self) -> bool {
        self.partition() == Partition::Protected
    }

    pub fn path(&self) -> String {
        match self {
            Route::Loading => "/".to_string(),
            Route::Login => "/auth/login".to_string(),
            Route::Signup => "/auth/signup".to_string(),
            Route::Dashboard => "/admin/dashboard".to_string(),
            Route::Bookings => "/admin/bookings".to_string(),
            Route::ParkingAreas => "/admin/parkingArea".to_string(),
            Route::AddArea => "/admin/addArea".to_string(),
            Route::EditArea { area_id } => format!("/admin/editArea?areaId={}", area_id),
            Route::ManageSlots => "/admin/manageSlots".to_string(),
            Route::OccupancyReport => "/admin/occupancyReport".to_string(),
            Route::RevenueReport => "/admin/revenueReport".to_string(),
            Route::Profile => "/profile/profile".to_string(),
            Route::NotFound => "/+not-found".to_string(),
        }
    }

    /// Parse a path produced by [`Route::path`]. Unknown paths map to `NotFound`.
    pub fn from_path(path: &str) -> Route {
        let (base, query) = path.split_once('?').unwrap_or((path, ""));
        match base.trim_end_matches('/') {
            "" => Route::Loading,
            "/auth/login" => Route::Login,
            "/auth/signup" => Route::Signup,
            "/admin/dashboard" => Route::Dashboard,
            "/admin/bookings" => Route::Bookings,
            "/admin/parkingArea" => Route::ParkingAreas,
            "/admin/addArea" => Route::AddArea,
            "/admin/editArea" => {
                let area_id = query
                    .split('&')
                    .find_map(|pair| pair.strip_prefix("areaId="))
                    .filter(|id| !id.is_empty());
                match area_id {
                    Some(id) => Route::EditArea {
                        area_id: id.to_string(),
                    },
                    None => Route::NotFound,
                }
            }
            "/admin/manageSlots" => Route::ManageSlots,
            "/admin/occupancyReport" => Route::OccupancyReport,
            "/admin/revenueReport" => Route::RevenueReport,
            "/profile/profile" => Route::Profile,
            _ => Route::NotFound,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
