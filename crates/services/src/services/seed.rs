//! Sample content for a fresh install.
//!
//! Only empty collections are filled, so running the seed twice is harmless.

use std::collections::BTreeMap;

use db::models::{
    Resource,
    activity::{Activity, CreateActivity},
    document::{CreateDocument, Document},
    family::{Child, CreateFamily, Family},
    gallery_image::{CreateGalleryImage, GalleryImage},
    menu_item::{CreateMenuItem, MenuItem},
    message::{CreateMessage, Message, UpdateMessage},
    program::{CreateProgram, Program},
    staff_member::{CreateStaffMember, StaffMember},
    transportation_route::{CreateTransportationRoute, RouteStop, TransportationRoute},
};
use serde::Serialize;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

use super::record_store::{RecordStore, RecordStoreError};

#[derive(Debug, Clone, Default, Serialize, TS)]
pub struct SeedReport {
    /// Records written per collection.
    pub inserted: BTreeMap<String, usize>,
    /// Collections left alone because they already had records.
    pub skipped: Vec<String>,
}

impl SeedReport {
    pub fn total_inserted(&self) -> usize {
        self.inserted.values().sum()
    }
}

pub async fn seed_sample_data<S: RecordStore>(store: &S) -> Result<SeedReport, RecordStoreError> {
    let mut report = SeedReport::default();
    seed::<Activity, _>(store, activities(), &mut report).await?;
    seed::<Program, _>(store, programs(), &mut report).await?;
    seed::<StaffMember, _>(store, staff(), &mut report).await?;
    seed::<Family, _>(store, families(), &mut report).await?;
    seed::<MenuItem, _>(store, menu(), &mut report).await?;
    seed::<Document, _>(store, documents(), &mut report).await?;
    seed::<TransportationRoute, _>(store, routes(), &mut report).await?;
    seed::<GalleryImage, _>(store, gallery(), &mut report).await?;
    seed_messages(store, &mut report).await?;
    info!(
        inserted = report.total_inserted(),
        skipped = report.skipped.len(),
        "Sample data seeded"
    );
    Ok(report)
}

async fn seed<R: Resource, S: RecordStore>(
    store: &S,
    rows: Vec<R::Create>,
    report: &mut SeedReport,
) -> Result<(), RecordStoreError> {
    if !store.list::<R>().await?.is_empty() {
        report.skipped.push(R::COLLECTION.to_string());
        return Ok(());
    }
    let count = rows.len();
    for row in rows {
        store.create::<R>(row).await?;
    }
    report.inserted.insert(R::COLLECTION.to_string(), count);
    Ok(())
}

async fn seed_messages<S: RecordStore>(
    store: &S,
    report: &mut SeedReport,
) -> Result<(), RecordStoreError> {
    if !store.list::<Message>().await?.is_empty() {
        report.skipped.push(Message::COLLECTION.to_string());
        return Ok(());
    }
    let rows = messages();
    let count = rows.len();
    for (data, read, starred) in rows {
        let message: Message = store.create(data).await?;
        if read || starred {
            let flags = UpdateMessage {
                read: Some(read),
                starred: Some(starred),
                ..Default::default()
            };
            store.update::<Message>(message.id, flags).await?;
        }
    }
    report.inserted.insert(Message::COLLECTION.to_string(), count);
    Ok(())
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn placeholder(width: u32, height: u32, text: &str) -> String {
    format!("/placeholder.svg?height={height}&width={width}&text={text}")
}

fn activities() -> Vec<CreateActivity> {
    let activity = |name: &str, description: &str, age_group: &str, duration: &str, materials: &[&str], text: &str| {
        CreateActivity {
            name: name.to_string(),
            description: description.to_string(),
            age_group: age_group.to_string(),
            duration: duration.to_string(),
            materials: strings(materials),
            image: Some(placeholder(400, 300, text)),
        }
    };
    vec![
        activity(
            "Sensory Play with Water",
            "Children explore water with various tools and containers to develop sensory skills and understand basic scientific concepts.",
            "Toddlers (1-2 years)",
            "30 minutes",
            &["Water table", "Cups", "Funnels", "Sponges", "Waterproof toys"],
            "Water+Play",
        ),
        activity(
            "Story Time & Puppet Show",
            "Interactive storytelling with puppets to enhance language development and imagination.",
            "Preschool (3-5 years)",
            "45 minutes",
            &["Children's books", "Puppets", "Felt board", "Props"],
            "Story+Time",
        ),
        activity(
            "Nature Scavenger Hunt",
            "Outdoor exploration activity where children search for natural items like leaves, rocks, and flowers.",
            "All ages",
            "1 hour",
            &["Collection bags", "Magnifying glasses", "Scavenger hunt lists", "Clipboards"],
            "Scavenger+Hunt",
        ),
        activity(
            "Music & Movement",
            "Children express themselves through dance, songs, and musical instruments to develop gross motor skills and rhythm.",
            "All ages",
            "40 minutes",
            &["Musical instruments", "Scarves", "Rhythm sticks", "Music player"],
            "Music+Time",
        ),
        activity(
            "Art Exploration: Finger Painting",
            "Creative expression through finger painting to develop fine motor skills and sensory exploration.",
            "Toddlers & Preschool",
            "45 minutes",
            &["Finger paint", "Paper", "Smocks", "Wet wipes"],
            "Finger+Painting",
        ),
    ]
}

fn programs() -> Vec<CreateProgram> {
    let program = |name: &str,
                   age_range: &str,
                   description: &str,
                   schedule: &str,
                   capacity: i32,
                   tuition: &str,
                   features: &[&str],
                   text: &str| CreateProgram {
        name: name.to_string(),
        age_range: age_range.to_string(),
        description: description.to_string(),
        schedule: schedule.to_string(),
        capacity,
        tuition: tuition.to_string(),
        features: strings(features),
        image: Some(placeholder(400, 300, text)),
    };
    vec![
        program(
            "Infant Care",
            "6 weeks - 12 months",
            "Our infant program provides a nurturing and stimulating environment for babies to explore and develop. We focus on sensory experiences, motor skills, and language development.",
            "Monday-Friday, 7:00 AM - 6:00 PM",
            8,
            "$350/week",
            &[
                "Low child-to-caregiver ratio (3:1)",
                "Daily reports",
                "Personalized care plans",
                "Tummy time",
                "Sensory activities",
            ],
            "Infant+Care",
        ),
        program(
            "Toddler Program",
            "1-2 years",
            "Our toddler program encourages independence, social skills, and language development through play-based learning and structured activities.",
            "Monday-Friday, 7:00 AM - 6:00 PM",
            12,
            "$325/week",
            &["Potty training support", "Language development", "Social skills", "Creative arts", "Outdoor play"],
            "Toddler+Program",
        ),
        program(
            "Preschool",
            "3-5 years",
            "Our preschool program prepares children for kindergarten through a balanced curriculum that includes pre-reading, math concepts, science exploration, and social studies.",
            "Monday-Friday, 7:00 AM - 6:00 PM",
            16,
            "$300/week",
            &[
                "Kindergarten readiness",
                "STEAM activities",
                "Field trips",
                "Spanish language introduction",
                "Physical education",
            ],
            "Preschool",
        ),
        program(
            "School Age Program",
            "6-12 years",
            "Our before and after school program provides a safe and enriching environment for school-age children with homework help, recreational activities, and special projects.",
            "Monday-Friday, 7:00-9:00 AM & 3:00-6:00 PM",
            20,
            "$175/week",
            &["Homework assistance", "STEM projects", "Arts & crafts", "Team sports", "Cooking activities"],
            "School+Age",
        ),
    ]
}

fn staff() -> Vec<CreateStaffMember> {
    let member = |name: &str, position: &str, bio: &str, qualifications: &[&str], start_date: &str, text: &str| {
        CreateStaffMember {
            name: name.to_string(),
            position: position.to_string(),
            bio: bio.to_string(),
            image: Some(placeholder(300, 300, text)),
            qualifications: strings(qualifications),
            start_date: start_date.to_string(),
        }
    };
    vec![
        member(
            "Laly Rodriguez",
            "Owner & Director",
            "With over 15 years of experience in early childhood education, Laly founded the daycare with a vision to create a nurturing environment where children can thrive.",
            &[
                "Early Childhood Education Degree",
                "CPR & First Aid Certified",
                "Child Development Associate (CDA)",
            ],
            "2010-03-15",
            "Laly",
        ),
        member(
            "Maria Gonzalez",
            "Lead Teacher",
            "Maria specializes in preschool education and brings creativity and enthusiasm to the classroom every day.",
            &["Bachelor's in Education", "Bilingual (English/Spanish)", "CPR & First Aid Certified"],
            "2015-08-10",
            "Maria",
        ),
        member(
            "James Wilson",
            "Assistant Teacher",
            "James is passionate about early childhood development and creates engaging activities that help children learn through play.",
            &["Associate's in Child Development", "CPR & First Aid Certified"],
            "2018-05-22",
            "James",
        ),
    ]
}

fn families() -> Vec<CreateFamily> {
    let child = |name: &str, age: i32, program: &str, allergies: &[&str]| Child {
        id: Uuid::new_v4(),
        name: name.to_string(),
        age,
        program: program.to_string(),
        allergies: strings(allergies),
    };
    let family = |parent_name: &str, email: &str, phone: &str, children: Vec<Child>| CreateFamily {
        parent_name: parent_name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        children,
    };
    vec![
        family(
            "Maria Rodriguez",
            "maria@example.com",
            "(123) 456-7890",
            vec![child("Sofia Rodriguez", 3, "Preschool", &["Peanuts"])],
        ),
        family(
            "John Smith",
            "john@example.com",
            "(234) 567-8901",
            vec![
                child("Emma Smith", 4, "Preschool", &[]),
                child("Noah Smith", 1, "Infant Care", &["Dairy"]),
            ],
        ),
        family(
            "David Johnson",
            "david@example.com",
            "(345) 678-9012",
            vec![child("Liam Johnson", 6, "School Age", &[])],
        ),
    ]
}

fn menu() -> Vec<CreateMenuItem> {
    let day = |day: &str, breakfast: &str, lunch: &str, snack: &str, allergies: &[&str]| CreateMenuItem {
        day: day.to_string(),
        breakfast: breakfast.to_string(),
        lunch: lunch.to_string(),
        snack: snack.to_string(),
        allergies: strings(allergies),
    };
    vec![
        day(
            "Monday",
            "Whole grain cereal with milk, banana slices",
            "Baked chicken, brown rice, steamed broccoli, apple slices",
            "Yogurt with granola, fresh berries",
            &["Dairy-free options available", "Gluten-free options available"],
        ),
        day(
            "Tuesday",
            "Oatmeal with cinnamon and apple, milk",
            "Bean and cheese quesadillas, corn, mixed green salad, orange slices",
            "Hummus with veggie sticks, whole grain crackers",
            &["Dairy-free options available"],
        ),
        day(
            "Wednesday",
            "Scrambled eggs, whole wheat toast, fruit cup",
            "Turkey and cheese sandwiches, carrot sticks, cucumber slices, pear",
            "Banana bread, milk",
            &["Gluten-free options available", "Egg-free options available"],
        ),
        day(
            "Thursday",
            "Yogurt parfait with granola and berries",
            "Pasta with tomato sauce, turkey meatballs, green beans, melon",
            "Cheese cubes, apple slices, whole grain crackers",
            &["Gluten-free pasta available", "Dairy-free options available"],
        ),
        day(
            "Friday",
            "Whole grain pancakes, fruit compote, milk",
            "Fish sticks, sweet potato fries, peas, banana",
            "Trail mix (no nuts), dried fruit",
            &["Fish-free options available", "Gluten-free options available"],
        ),
    ]
}

fn documents() -> Vec<CreateDocument> {
    let doc = |name: &str,
               doc_type: &str,
               category: &str,
               format: &str,
               last_updated: &str,
               size: &str,
               required: bool,
               description: &str| CreateDocument {
        name: name.to_string(),
        doc_type: doc_type.to_string(),
        category: category.to_string(),
        format: format.to_string(),
        last_updated: last_updated.to_string(),
        size: size.to_string(),
        required,
        description: description.to_string(),
    };
    vec![
        doc("Enrollment Form", "form", "enrollment", "pdf", "2023-05-15", "245 KB", true, "Required form for all new enrollments"),
        doc("Medical Authorization", "form", "medical", "pdf", "2023-06-22", "180 KB", true, "Authorization for emergency medical treatment"),
        doc("Parent Handbook", "handbook", "policies", "pdf", "2023-04-10", "1.2 MB", false, "Comprehensive guide to daycare policies and procedures"),
        doc("Weekly Menu Template", "template", "food", "xlsx", "2023-07-05", "78 KB", false, "Template for planning weekly meals"),
        doc("Emergency Contact Form", "form", "emergency", "pdf", "2023-05-18", "150 KB", true, "Emergency contact information for each child"),
    ]
}

fn routes() -> Vec<CreateTransportationRoute> {
    let stops = |stops: &[(&str, &str)]| {
        stops
            .iter()
            .map(|(location, time)| RouteStop {
                location: location.to_string(),
                time: time.to_string(),
            })
            .collect::<Vec<_>>()
    };
    let route = |name: &str, areas: &[&str], schedule: &str, driver: &str, current_children: i32, stops: Vec<RouteStop>| {
        CreateTransportationRoute {
            name: name.to_string(),
            areas: strings(areas),
            schedule: schedule.to_string(),
            driver: driver.to_string(),
            capacity: 8,
            current_children,
            stops,
        }
    };
    vec![
        route(
            "Morning Pickup - North Route",
            &["Bronx North", "Fordham"],
            "7:00 AM - 8:00 AM",
            "Michael Johnson",
            6,
            stops(&[
                ("2145 Bronx Park East", "7:15 AM"),
                ("1823 Morris Avenue", "7:30 AM"),
                ("2560 Decatur Avenue", "7:45 AM"),
            ]),
        ),
        route(
            "Morning Pickup - South Route",
            &["Bronx South", "Hunts Point"],
            "7:15 AM - 8:15 AM",
            "Sarah Williams",
            5,
            stops(&[
                ("985 Southern Boulevard", "7:20 AM"),
                ("1240 Lafayette Avenue", "7:35 AM"),
                ("875 Longwood Avenue", "7:50 AM"),
            ]),
        ),
        route(
            "Afternoon Dropoff - North Route",
            &["Bronx North", "Fordham"],
            "5:00 PM - 6:00 PM",
            "Michael Johnson",
            6,
            stops(&[
                ("2145 Bronx Park East", "5:15 PM"),
                ("1823 Morris Avenue", "5:30 PM"),
                ("2560 Decatur Avenue", "5:45 PM"),
            ]),
        ),
    ]
}

fn gallery() -> Vec<CreateGalleryImage> {
    let image = |title: &str, description: &str, text: &str| CreateGalleryImage {
        url: placeholder(600, 400, text),
        public_id: None,
        title: Some(title.to_string()),
        description: Some(description.to_string()),
    };
    vec![
        image("Art Activity", "Children enjoying finger painting during art time", "Art+Activity"),
        image("Outdoor Play", "Fun at the playground during outdoor time", "Outdoor+Play"),
        image("Story Time", "Group story time with our favorite books", "Story+Time"),
        image("Graduation Day", "Preschool graduation celebration", "Graduation+Day"),
    ]
}

/// Inbox samples with their (read, starred) flags.
fn messages() -> Vec<(CreateMessage, bool, bool)> {
    let message = |sender: &str, email: &str, subject: &str, body: &str| CreateMessage {
        sender: sender.to_string(),
        email: email.to_string(),
        phone: None,
        subject: subject.to_string(),
        body: body.to_string(),
    };
    vec![
        (
            message(
                "Maria Rodriguez",
                "maria@example.com",
                "Question about enrollment",
                "Hello, I'm interested in enrolling my daughter in your daycare. Could you please provide more information about the enrollment process and availability?",
            ),
            true,
            false,
        ),
        (
            message(
                "John Smith",
                "john@example.com",
                "Schedule change request",
                "I need to change my son's schedule starting next week. He will be attending Monday, Wednesday, and Friday instead of the full week. Please let me know if this is possible.",
            ),
            false,
            true,
        ),
        (
            message(
                "Sarah Johnson",
                "sarah@example.com",
                "Dietary restrictions",
                "I wanted to inform you that my child has been diagnosed with a gluten allergy. Could you please ensure that his meals are gluten-free? Let me know if you need any additional information.",
            ),
            false,
            false,
        ),
        (
            message(
                "David Williams",
                "david@example.com",
                "Vacation notice",
                "We will be on vacation from December 20th to January 3rd. My daughter will not be attending during this period. Please adjust the billing accordingly.",
            ),
            true,
            false,
        ),
        (
            message(
                "Emily Brown",
                "emily@example.com",
                "Feedback on recent event",
                "I just wanted to say thank you for organizing the winter celebration. My son had a wonderful time and hasn't stopped talking about it. The staff did an amazing job!",
            ),
            true,
            true,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use db::{COLLECTIONS, DBService};

    use super::*;

    #[tokio::test]
    async fn fresh_database_gets_every_collection() {
        let db = DBService::new_in_memory().await.unwrap();
        let report = seed_sample_data(&db).await.unwrap();
        assert_eq!(report.inserted.len(), COLLECTIONS.len());
        assert!(report.skipped.is_empty());

        let messages = db.list::<Message>().await.unwrap();
        assert_eq!(Message::unread_count(&messages), 2);
        assert_eq!(messages.iter().filter(|m| m.starred).count(), 2);
        let families = db.list::<Family>().await.unwrap();
        assert_eq!(families.iter().map(|f| f.children.len()).sum::<usize>(), 4);
    }

    #[tokio::test]
    async fn populated_collections_are_left_alone() {
        let db = DBService::new_in_memory().await.unwrap();
        db.create::<Program>(programs().remove(0)).await.unwrap();

        let report = seed_sample_data(&db).await.unwrap();
        assert_eq!(report.skipped, vec!["programs".to_string()]);
        assert_eq!(db.list::<Program>().await.unwrap().len(), 1);

        let again = seed_sample_data(&db).await.unwrap();
        assert_eq!(again.total_inserted(), 0);
        assert_eq!(again.skipped.len(), COLLECTIONS.len());
    }
}
