//! Dialog schemas and form-to-payload mapping for each dashboard collection.

use std::collections::HashMap;

use chrono::Utc;
use db::models::{
    activity::{Activity, CreateActivity, UpdateActivity},
    document::{CreateDocument, Document, UpdateDocument},
    family::{Child, CreateFamily, Family, UpdateFamily},
    gallery_image::{CreateGalleryImage, GalleryImage, UpdateGalleryImage},
    menu_item::{CreateMenuItem, MenuItem, UpdateMenuItem},
    message::{CreateMessage, Message, UpdateMessage},
    program::{CreateProgram, Program, UpdateProgram},
    staff_member::{CreateStaffMember, StaffMember, UpdateStaffMember},
    transportation_route::{
        CreateTransportationRoute, RouteStop, TransportationRoute, UpdateTransportationRoute,
    },
};
use utils::text::join_list;
use uuid::Uuid;

use super::{
    data_provider::SnapshotCollection,
    form::{FieldKind, FieldSpec, FormError, FormSchema, FormValues},
};

pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg?height=300&width=400";
pub const PLACEHOLDER_PORTRAIT: &str = "/placeholder.svg";
pub const DEFAULT_TUITION: &str = "$300/week";
pub const DEFAULT_DOCUMENT_SIZE: &str = "0 KB";

/// A collection managed through the generic dashboard page.
pub trait DashboardResource: SnapshotCollection {
    /// Column the table search box filters on.
    const SEARCH_FIELD: &'static str;

    fn schema() -> FormSchema;

    fn create_from_form(values: &FormValues) -> Result<Self::Create, FormError>;

    /// Build a patch from the edit dialog. Fields the dialog does not show keep
    /// their stored value.
    fn update_from_form(current: &Self, values: &FormValues) -> Result<Self::Update, FormError>;

    /// Edit dialog inputs pre-populated from `record`.
    fn form_defaults(record: &Self) -> HashMap<String, String>;

    /// Image host identifier to remove alongside the record.
    fn remote_asset(&self) -> Option<&str> {
        None
    }
}

fn defaults<const N: usize>(pairs: [(&str, String); N]) -> HashMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

impl DashboardResource for Activity {
    const SEARCH_FIELD: &'static str = "name";

    fn schema() -> FormSchema {
        FormSchema::new()
            .field(FieldSpec::text("name", "Activity Name").required())
            .field(FieldSpec::text("age_group", "Age Group").required())
            .field(FieldSpec::new("description", "Description", FieldKind::Textarea).required())
            .field(FieldSpec::text("duration", "Duration").required())
            .field(FieldSpec::new("materials", "Materials", FieldKind::CommaList).required())
            .field(FieldSpec::text("image", "Image URL"))
    }

    fn create_from_form(values: &FormValues) -> Result<CreateActivity, FormError> {
        Ok(CreateActivity {
            name: values.get("name").to_string(),
            description: values.get("description").to_string(),
            age_group: values.get("age_group").to_string(),
            duration: values.get("duration").to_string(),
            materials: values.list("materials"),
            image: Some(
                values
                    .non_empty("image")
                    .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            ),
        })
    }

    fn update_from_form(_current: &Self, values: &FormValues) -> Result<UpdateActivity, FormError> {
        Ok(UpdateActivity {
            name: Some(values.get("name").to_string()),
            description: Some(values.get("description").to_string()),
            age_group: Some(values.get("age_group").to_string()),
            duration: Some(values.get("duration").to_string()),
            materials: Some(values.list("materials")),
            image: values.non_empty("image"),
        })
    }

    fn form_defaults(record: &Self) -> HashMap<String, String> {
        defaults([
            ("name", record.name.clone()),
            ("age_group", record.age_group.clone()),
            ("description", record.description.clone()),
            ("duration", record.duration.clone()),
            ("materials", join_list(&record.materials)),
            ("image", record.image.clone().unwrap_or_default()),
        ])
    }
}

impl DashboardResource for Program {
    const SEARCH_FIELD: &'static str = "name";

    fn schema() -> FormSchema {
        FormSchema::new()
            .field(FieldSpec::text("name", "Program Name").required())
            .field(FieldSpec::text("age_range", "Age Range").required())
            .field(FieldSpec::new("description", "Description", FieldKind::Textarea).required())
            .field(FieldSpec::new("capacity", "Capacity", FieldKind::Number).required())
            .field(FieldSpec::text("schedule", "Schedule").required())
            .field(FieldSpec::text("tuition", "Tuition"))
            .field(FieldSpec::new("features", "Activities & Features", FieldKind::CommaList).required())
            .field(FieldSpec::text("image", "Image URL"))
    }

    fn create_from_form(values: &FormValues) -> Result<CreateProgram, FormError> {
        Ok(CreateProgram {
            name: values.get("name").to_string(),
            age_range: values.get("age_range").to_string(),
            description: values.get("description").to_string(),
            schedule: values.get("schedule").to_string(),
            capacity: values.int("capacity")?,
            tuition: values
                .non_empty("tuition")
                .unwrap_or_else(|| DEFAULT_TUITION.to_string()),
            features: values.list("features"),
            image: Some(
                values
                    .non_empty("image")
                    .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            ),
        })
    }

    fn update_from_form(_current: &Self, values: &FormValues) -> Result<UpdateProgram, FormError> {
        Ok(UpdateProgram {
            name: Some(values.get("name").to_string()),
            age_range: Some(values.get("age_range").to_string()),
            description: Some(values.get("description").to_string()),
            schedule: Some(values.get("schedule").to_string()),
            capacity: Some(values.int("capacity")?),
            tuition: values.non_empty("tuition"),
            features: Some(values.list("features")),
            image: values.non_empty("image"),
        })
    }

    fn form_defaults(record: &Self) -> HashMap<String, String> {
        defaults([
            ("name", record.name.clone()),
            ("age_range", record.age_range.clone()),
            ("description", record.description.clone()),
            ("capacity", record.capacity.to_string()),
            ("schedule", record.schedule.clone()),
            ("tuition", record.tuition.clone()),
            ("features", join_list(&record.features)),
            ("image", record.image.clone().unwrap_or_default()),
        ])
    }
}

impl DashboardResource for StaffMember {
    const SEARCH_FIELD: &'static str = "name";

    fn schema() -> FormSchema {
        FormSchema::new()
            .field(FieldSpec::text("name", "Full Name").required())
            .field(FieldSpec::text("position", "Position").required())
            .field(FieldSpec::new("bio", "Bio", FieldKind::Textarea).required())
            .field(
                FieldSpec::new("qualifications", "Certifications", FieldKind::CommaList).required(),
            )
            .field(FieldSpec::new("start_date", "Start Date", FieldKind::Date))
            .field(FieldSpec::text("image", "Photo URL"))
    }

    fn create_from_form(values: &FormValues) -> Result<CreateStaffMember, FormError> {
        Ok(CreateStaffMember {
            name: values.get("name").to_string(),
            position: values.get("position").to_string(),
            bio: values.get("bio").to_string(),
            image: Some(
                values
                    .non_empty("image")
                    .unwrap_or_else(|| PLACEHOLDER_PORTRAIT.to_string()),
            ),
            qualifications: values.list("qualifications"),
            start_date: values.non_empty("start_date").unwrap_or_else(today),
        })
    }

    fn update_from_form(
        _current: &Self,
        values: &FormValues,
    ) -> Result<UpdateStaffMember, FormError> {
        Ok(UpdateStaffMember {
            name: Some(values.get("name").to_string()),
            position: Some(values.get("position").to_string()),
            bio: Some(values.get("bio").to_string()),
            image: values.non_empty("image"),
            qualifications: Some(values.list("qualifications")),
            start_date: values.non_empty("start_date"),
        })
    }

    fn form_defaults(record: &Self) -> HashMap<String, String> {
        defaults([
            ("name", record.name.clone()),
            ("position", record.position.clone()),
            ("bio", record.bio.clone()),
            ("qualifications", join_list(&record.qualifications)),
            ("start_date", record.start_date.clone()),
            ("image", record.image.clone().unwrap_or_default()),
        ])
    }
}

impl DashboardResource for Family {
    const SEARCH_FIELD: &'static str = "parent_name";

    /// Creation also captures the first child; editing only touches the parent.
    fn schema() -> FormSchema {
        FormSchema::new()
            .field(FieldSpec::text("parent_name", "Parent Name").required())
            .field(FieldSpec::new("email", "Email", FieldKind::Email).required())
            .field(FieldSpec::text("phone", "Phone").required())
            .field(FieldSpec::text("child_name", "Child Name"))
            .field(FieldSpec::new("child_age", "Child Age", FieldKind::Number))
            .field(FieldSpec::text("program", "Program"))
            .field(FieldSpec::new("allergies", "Allergies", FieldKind::CommaList))
    }

    fn create_from_form(values: &FormValues) -> Result<CreateFamily, FormError> {
        let child_name = values.non_empty("child_name").ok_or_else(|| FormError::MissingField {
            field: "child_name".to_string(),
            label: "Child Name".to_string(),
        })?;
        Ok(CreateFamily {
            parent_name: values.get("parent_name").to_string(),
            email: values.get("email").to_string(),
            phone: values.get("phone").to_string(),
            children: vec![Child {
                id: Uuid::new_v4(),
                name: child_name,
                age: values.int("child_age")?,
                program: values.get("program").to_string(),
                allergies: values.optional_list("allergies"),
            }],
        })
    }

    fn update_from_form(_current: &Self, values: &FormValues) -> Result<UpdateFamily, FormError> {
        Ok(UpdateFamily {
            parent_name: Some(values.get("parent_name").to_string()),
            email: Some(values.get("email").to_string()),
            phone: Some(values.get("phone").to_string()),
            children: None,
        })
    }

    fn form_defaults(record: &Self) -> HashMap<String, String> {
        defaults([
            ("parent_name", record.parent_name.clone()),
            ("email", record.email.clone()),
            ("phone", record.phone.clone()),
        ])
    }
}

impl DashboardResource for MenuItem {
    const SEARCH_FIELD: &'static str = "day";

    fn schema() -> FormSchema {
        FormSchema::new()
            .field(FieldSpec::text("day", "Day").required())
            .field(FieldSpec::new("breakfast", "Breakfast", FieldKind::Textarea).required())
            .field(FieldSpec::new("lunch", "Lunch", FieldKind::Textarea).required())
            .field(FieldSpec::new("snack", "Snack", FieldKind::Textarea).required())
            .field(FieldSpec::new("allergies", "Allergy Notes", FieldKind::CommaList))
    }

    fn create_from_form(values: &FormValues) -> Result<CreateMenuItem, FormError> {
        Ok(CreateMenuItem {
            day: values.get("day").to_string(),
            breakfast: values.get("breakfast").to_string(),
            lunch: values.get("lunch").to_string(),
            snack: values.get("snack").to_string(),
            allergies: values.optional_list("allergies"),
        })
    }

    fn update_from_form(_current: &Self, values: &FormValues) -> Result<UpdateMenuItem, FormError> {
        Ok(UpdateMenuItem {
            day: Some(values.get("day").to_string()),
            breakfast: Some(values.get("breakfast").to_string()),
            lunch: Some(values.get("lunch").to_string()),
            snack: Some(values.get("snack").to_string()),
            allergies: Some(values.optional_list("allergies")),
        })
    }

    fn form_defaults(record: &Self) -> HashMap<String, String> {
        defaults([
            ("day", record.day.clone()),
            ("breakfast", record.breakfast.clone()),
            ("lunch", record.lunch.clone()),
            ("snack", record.snack.clone()),
            ("allergies", join_list(&record.allergies)),
        ])
    }
}

impl DashboardResource for Document {
    const SEARCH_FIELD: &'static str = "name";

    fn schema() -> FormSchema {
        FormSchema::new()
            .field(FieldSpec::text("name", "Document Name").required())
            .field(FieldSpec::text("doc_type", "Type").required())
            .field(FieldSpec::text("category", "Category").required())
            .field(FieldSpec::text("format", "Format").required())
            .field(FieldSpec::text("size", "Size"))
            .field(FieldSpec::new("required", "Required", FieldKind::Checkbox))
            .field(FieldSpec::new("description", "Description", FieldKind::Textarea).required())
    }

    fn create_from_form(values: &FormValues) -> Result<CreateDocument, FormError> {
        Ok(CreateDocument {
            name: values.get("name").to_string(),
            doc_type: values.get("doc_type").to_string(),
            category: values.get("category").to_string(),
            format: values.get("format").to_string(),
            last_updated: today(),
            size: values
                .non_empty("size")
                .unwrap_or_else(|| DEFAULT_DOCUMENT_SIZE.to_string()),
            required: values.flag("required"),
            description: values.get("description").to_string(),
        })
    }

    fn update_from_form(_current: &Self, values: &FormValues) -> Result<UpdateDocument, FormError> {
        Ok(UpdateDocument {
            name: Some(values.get("name").to_string()),
            doc_type: Some(values.get("doc_type").to_string()),
            category: Some(values.get("category").to_string()),
            format: Some(values.get("format").to_string()),
            last_updated: None,
            size: None,
            required: Some(values.flag("required")),
            description: Some(values.get("description").to_string()),
        })
    }

    fn form_defaults(record: &Self) -> HashMap<String, String> {
        defaults([
            ("name", record.name.clone()),
            ("doc_type", record.doc_type.clone()),
            ("category", record.category.clone()),
            ("format", record.format.clone()),
            ("size", record.size.clone()),
            ("required", record.required.to_string()),
            ("description", record.description.clone()),
        ])
    }
}

impl DashboardResource for Message {
    const SEARCH_FIELD: &'static str = "subject";

    fn schema() -> FormSchema {
        FormSchema::new()
            .field(FieldSpec::text("sender", "From").required())
            .field(FieldSpec::new("email", "Email", FieldKind::Email).required())
            .field(FieldSpec::text("phone", "Phone"))
            .field(FieldSpec::text("subject", "Subject").required())
            .field(FieldSpec::new("body", "Message", FieldKind::Textarea).required())
    }

    fn create_from_form(values: &FormValues) -> Result<CreateMessage, FormError> {
        Ok(CreateMessage {
            sender: values.get("sender").to_string(),
            email: values.get("email").to_string(),
            phone: values.non_empty("phone"),
            subject: values.get("subject").to_string(),
            body: values.get("body").to_string(),
        })
    }

    fn update_from_form(_current: &Self, values: &FormValues) -> Result<UpdateMessage, FormError> {
        Ok(UpdateMessage {
            sender: Some(values.get("sender").to_string()),
            email: Some(values.get("email").to_string()),
            phone: values.non_empty("phone"),
            subject: Some(values.get("subject").to_string()),
            body: Some(values.get("body").to_string()),
            ..Default::default()
        })
    }

    fn form_defaults(record: &Self) -> HashMap<String, String> {
        defaults([
            ("sender", record.sender.clone()),
            ("email", record.email.clone()),
            ("phone", record.phone.clone().unwrap_or_default()),
            ("subject", record.subject.clone()),
            ("body", record.body.clone()),
        ])
    }
}

impl DashboardResource for TransportationRoute {
    const SEARCH_FIELD: &'static str = "name";

    fn schema() -> FormSchema {
        let mut schema = FormSchema::new()
            .field(FieldSpec::text("name", "Route Name").required())
            .field(FieldSpec::new("areas", "Areas Served", FieldKind::CommaList).required())
            .field(FieldSpec::text("schedule", "Schedule").required())
            .field(FieldSpec::text("driver", "Driver").required())
            .field(FieldSpec::new("capacity", "Capacity", FieldKind::Number).required())
            .field(FieldSpec::new("current_children", "Current Children", FieldKind::Number));
        for (location, time, location_label, time_label) in STOP_FIELDS {
            schema = schema
                .field(FieldSpec::text(location, location_label))
                .field(FieldSpec::text(time, time_label));
        }
        schema
    }

    fn create_from_form(values: &FormValues) -> Result<CreateTransportationRoute, FormError> {
        let stops = STOP_FIELDS
            .iter()
            .filter_map(|(location, time, _, _)| {
                Some(RouteStop {
                    location: values.non_empty(location)?,
                    time: values.non_empty(time)?,
                })
            })
            .collect();
        Ok(CreateTransportationRoute {
            name: values.get("name").to_string(),
            areas: values.list("areas"),
            schedule: values.get("schedule").to_string(),
            driver: values.get("driver").to_string(),
            capacity: values.int("capacity")?,
            current_children: values.int_or("current_children", 0)?,
            stops,
        })
    }

    fn update_from_form(
        _current: &Self,
        values: &FormValues,
    ) -> Result<UpdateTransportationRoute, FormError> {
        Ok(UpdateTransportationRoute {
            name: Some(values.get("name").to_string()),
            areas: Some(values.list("areas")),
            schedule: Some(values.get("schedule").to_string()),
            driver: Some(values.get("driver").to_string()),
            capacity: Some(values.int("capacity")?),
            current_children: Some(values.int_or("current_children", 0)?),
            stops: None,
        })
    }

    fn form_defaults(record: &Self) -> HashMap<String, String> {
        defaults([
            ("name", record.name.clone()),
            ("areas", join_list(&record.areas)),
            ("schedule", record.schedule.clone()),
            ("driver", record.driver.clone()),
            ("capacity", record.capacity.to_string()),
            ("current_children", record.current_children.to_string()),
        ])
    }
}

const STOP_FIELDS: [(&str, &str, &str, &str); 3] = [
    ("stop1_location", "stop1_time", "Stop 1 Location", "Stop 1 Time"),
    ("stop2_location", "stop2_time", "Stop 2 Location", "Stop 2 Time"),
    ("stop3_location", "stop3_time", "Stop 3 Location", "Stop 3 Time"),
];

impl DashboardResource for GalleryImage {
    const SEARCH_FIELD: &'static str = "title";

    fn schema() -> FormSchema {
        FormSchema::new()
            .field(FieldSpec::text("url", "Image URL").required())
            .field(FieldSpec::text("title", "Title"))
            .field(FieldSpec::new("description", "Description", FieldKind::Textarea))
    }

    fn create_from_form(values: &FormValues) -> Result<CreateGalleryImage, FormError> {
        Ok(CreateGalleryImage {
            url: values.get("url").to_string(),
            public_id: None,
            title: values.non_empty("title"),
            description: values.non_empty("description"),
        })
    }

    fn update_from_form(
        _current: &Self,
        values: &FormValues,
    ) -> Result<UpdateGalleryImage, FormError> {
        Ok(UpdateGalleryImage {
            url: Some(values.get("url").to_string()),
            public_id: None,
            title: values.non_empty("title"),
            description: values.non_empty("description"),
        })
    }

    fn form_defaults(record: &Self) -> HashMap<String, String> {
        defaults([
            ("url", record.url.clone()),
            ("title", record.title.clone().unwrap_or_default()),
            ("description", record.description.clone().unwrap_or_default()),
        ])
    }

    fn remote_asset(&self) -> Option<&str> {
        self.public_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submit<R: DashboardResource>(pairs: &[(&str, &str)]) -> Result<FormValues, FormError> {
        let raw = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        R::schema().collect(&raw)
    }

    #[test]
    fn program_form_applies_tuition_and_image_defaults() {
        let values = submit::<Program>(&[
            ("name", "Toddler Explorers"),
            ("age_range", "1-2 years"),
            ("description", "Hands-on discovery"),
            ("capacity", "12"),
            ("schedule", "Mon-Fri"),
            ("features", "Tummy time, Sensory play,"),
        ])
        .unwrap();
        let create = Program::create_from_form(&values).unwrap();
        assert_eq!(create.tuition, "$300/week");
        assert_eq!(create.features, vec!["Tummy time", "Sensory play", ""]);
        assert_eq!(create.image.as_deref(), Some(PLACEHOLDER_IMAGE));
        assert_eq!(create.capacity, 12);
    }

    #[test]
    fn family_create_embeds_one_child_with_optional_allergies() {
        let values = submit::<Family>(&[
            ("parent_name", "Maria Rodriguez"),
            ("email", "maria@example.com"),
            ("phone", "(123) 456-7890"),
            ("child_name", "Sofia Rodriguez"),
            ("child_age", "3"),
            ("program", "Preschool"),
            ("allergies", ""),
        ])
        .unwrap();
        let create = Family::create_from_form(&values).unwrap();
        assert_eq!(create.children.len(), 1);
        assert_eq!(create.children[0].age, 3);
        assert!(create.children[0].allergies.is_empty());
    }

    #[test]
    fn family_edit_leaves_children_alone() {
        let values = submit::<Family>(&[
            ("parent_name", "John Smith"),
            ("email", "john@example.com"),
            ("phone", "(234) 567-8901"),
        ])
        .unwrap();
        let now = Utc::now();
        let current = Family {
            id: Uuid::new_v4(),
            parent_name: "John".to_string(),
            email: "john@example.com".to_string(),
            phone: "".to_string(),
            children: vec![],
            created_at: now,
            updated_at: now,
        };
        let update = Family::update_from_form(&current, &values).unwrap();
        assert!(update.children.is_none());
        assert_eq!(update.parent_name.as_deref(), Some("John Smith"));
    }

    #[test]
    fn route_stops_need_both_location_and_time() {
        let values = submit::<TransportationRoute>(&[
            ("name", "North Route"),
            ("areas", "Bronx North, Fordham"),
            ("schedule", "7:00 AM - 8:00 AM"),
            ("driver", "Michael Johnson"),
            ("capacity", "8"),
            ("stop1_location", "2145 Bronx Park East"),
            ("stop1_time", "7:15 AM"),
            ("stop2_location", "1823 Morris Avenue"),
            ("stop3_time", "7:45 AM"),
        ])
        .unwrap();
        let create = TransportationRoute::create_from_form(&values).unwrap();
        assert_eq!(create.current_children, 0);
        assert_eq!(
            create.stops,
            vec![RouteStop {
                location: "2145 Bronx Park East".to_string(),
                time: "7:15 AM".to_string(),
            }]
        );
    }

    #[test]
    fn document_create_stamps_today_and_default_size() {
        let values = submit::<Document>(&[
            ("name", "Enrollment Form"),
            ("doc_type", "form"),
            ("category", "enrollment"),
            ("format", "pdf"),
            ("required", "true"),
            ("description", "Required for new enrollments"),
        ])
        .unwrap();
        let create = Document::create_from_form(&values).unwrap();
        assert_eq!(create.size, "0 KB");
        assert_eq!(create.last_updated, today());
        assert!(create.required);
    }

    #[test]
    fn edit_defaults_join_lists_with_comma_space() {
        let now = Utc::now();
        let activity = Activity {
            id: Uuid::new_v4(),
            name: "Music & Movement".to_string(),
            description: "Dance and songs".to_string(),
            age_group: "All ages".to_string(),
            duration: "40 minutes".to_string(),
            materials: vec!["Scarves".to_string(), "Rhythm sticks".to_string()],
            image: None,
            created_at: now,
            updated_at: now,
        };
        let defaults = Activity::form_defaults(&activity);
        assert_eq!(defaults["materials"], "Scarves, Rhythm sticks");
        assert_eq!(defaults["image"], "");
    }
}
