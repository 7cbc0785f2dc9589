pub struct ZoneFields;

impl ZoneFields {
    pub const ID: &'static str = "id";
    pub const NAME: &'static str = "name";
    pub const LATITUDE: &'static str = "latitude";
    pub const LONGITUDE: &'static str = "longitude";
}

pub struct ProfileFields;

impl ProfileFields {
    pub const DISPLAY_NAME: &'static str = "display_name";
    pub const NOTIFICATION_MESSAGES: &'static str = "notification_messages";
}
