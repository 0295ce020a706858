//! Built-in registry snapshot for the Odesa, Mykolaiv and Kherson regions.

use super::organization::{OrgStatus, Organization};

/// Registry spreadsheet (actors, services, contacts)
pub const SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/1ev98ifed1h8xc16KcWaOmvaky8I9StuE0-6w7UPG4K4/edit?gid=1212063265#gid=1212063265";

/// Shared Drive folder with organization documents
pub const DRIVE_URL: &str =
    "https://drive.google.com/drive/folders/1kSQKI_-2b8mmWfUw5ZHvGaDD9g4tPWqU?usp=sharing";

pub const REGIONS: &str = "Одеська, Миколаївська, Херсонська";

#[allow(clippy::too_many_arguments)]
fn record(
    id: &str,
    name: &str,
    address: &str,
    lat: f64,
    lng: f64,
    category: &str,
    services: &str,
    phone: &str,
    email: &str,
    status: OrgStatus,
    budget: f64,
) -> Organization {
    Organization {
        id: id.to_string(),
        name: name.to_string(),
        address: address.to_string(),
        lat,
        lng,
        category: category.to_string(),
        services: services.to_string(),
        phone: phone.to_string(),
        email: email.to_string(),
        status,
        drive_folder_url: DRIVE_URL.to_string(),
        budget,
    }
}

pub fn builtin_organizations() -> Vec<Organization> {
    let posmishka_services = "Всі види допомоги (гуманітарна, психологічна, соціальна)";
    vec![
        record(
            "1",
            "БФ \"Корпорація Монстрів\"",
            "вул. Пантелеймонівська, 21, Одеса",
            46.4694,
            30.7404,
            "Благодійний фонд",
            "Гуманітарна допомога, медичне забезпечення лікарень, допомога ВПО, адресна допомога дітям.",
            "+380 99 123 4567",
            "info@monsters.org.ua",
            OrgStatus::Active,
            25_000_000.0,
        ),
        record(
            "2",
            "Гуманітарний штаб \"Миколаїв\"",
            "вул. Нікольська, 25, Миколаїв",
            46.9750,
            31.9946,
            "Волонтерський штаб",
            "Роздача продуктових наборів, забезпечення питною водою, евакуація населення.",
            "+380 63 987 6543",
            "help@mykolaiv.volunteer",
            OrgStatus::Active,
            12_500_000.0,
        ),
        record(
            "3",
            "Херсонський Хаб \"Я - Херсон\"",
            "пл. Свободи, 1, Херсон",
            46.6354,
            32.6169,
            "Громадська організація",
            "Психологічна підтримка, юридичні консультації, відновлення документів, шелтер.",
            "+380 50 555 0101",
            "support@kherson.hub",
            OrgStatus::Active,
            8_100_000.0,
        ),
        record(
            "4",
            "Карітас Одеса УГКЦ",
            "вул. Південна, 40, Одеса",
            46.4580,
            30.7100,
            "Релігійна місія",
            "Догляд вдома, робота з дітьми та молоддю, кризовий центр, гуманітарна допомога.",
            "+380 48 777 8899",
            "caritas@odessa.ugcc",
            OrgStatus::Active,
            18_000_000.0,
        ),
        record(
            "5",
            "Червоний Хрест Миколаївщини",
            "пр. Центральний, 12, Миколаїв",
            46.9660,
            32.0000,
            "Міжнародна організація",
            "Навчання першій допомозі, видача ваучерів, підтримка літніх людей.",
            "+380 512 34 56 78",
            "mk@redcross.org.ua",
            OrgStatus::Active,
            30_000_000.0,
        ),
        record(
            "6",
            "Волонтерський центр \"Корабельний\"",
            "Корабельний район, Херсон",
            46.6100,
            32.5800,
            "Волонтерський пункт",
            "Гаряче харчування, пункти обігріву, допомога з будматеріалами.",
            "+380 66 222 3344",
            "korabelny@volunteer.ks",
            OrgStatus::Pending,
            950_000.0,
        ),
        record(
            "7",
            "БФ \"ПОСМІШКА ЮА\" (Одеса)",
            "м. Одеса, Одеська область",
            46.4825,
            30.7233,
            "Благодійний фонд",
            posmishka_services,
            "+380 50 460 2240",
            "contact@posmishka.org.ua",
            OrgStatus::Active,
            100_000_000.0,
        ),
        record(
            "8",
            "БФ \"ПОСМІШКА ЮА\" (Миколаїв)",
            "м. Миколаїв, Миколаївська область",
            46.9600,
            32.0100,
            "Благодійний фонд",
            posmishka_services,
            "+380 50 460 2240",
            "contact@posmishka.org.ua",
            OrgStatus::Active,
            100_000_000.0,
        ),
        record(
            "9",
            "БФ \"ПОСМІШКА ЮА\" (Херсон)",
            "м. Херсон, Херсонська область",
            46.6400,
            32.6100,
            "Благодійний фонд",
            posmishka_services,
            "+380 50 460 2240",
            "contact@posmishka.org.ua",
            OrgStatus::Active,
            100_000_000.0,
        ),
    ]
}
