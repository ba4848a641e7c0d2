//! Diesel table definitions.
//!
//! `apartments_apartmentpost`, `users_user` and `apartments_favoriteapartment`
//! belong to the external LIVIO database; they are declared here so Diesel can
//! read/write them but are never created or migrated by this service.
//! `api_university` and `api_listing_image` are owned by this service and
//! covered by the embedded migrations.

diesel::table! {
    apartments_apartmentpost (id) {
        id -> Int8,
        #[max_length = 200]
        title -> Varchar,
        description -> Text,
        #[max_length = 200]
        location -> Varchar,
        #[max_length = 300]
        address -> Nullable<Varchar>,
        #[max_length = 100]
        city -> Varchar,
        #[max_length = 40]
        state -> Varchar,
        #[max_length = 10]
        zip_code -> Nullable<Varchar>,
        latitude -> Nullable<Numeric>,
        longitude -> Nullable<Numeric>,
        monthly_rent -> Numeric,
        #[max_length = 20]
        bedrooms -> Varchar,
        #[max_length = 20]
        bathrooms -> Varchar,
        square_feet -> Nullable<Int4>,
        #[max_length = 50]
        room_type -> Varchar,
        #[max_length = 500]
        amenities -> Varchar,
        #[max_length = 500]
        image_url -> Varchar,
        is_active -> Bool,
        available_from -> Nullable<Date>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        owner_id -> Int8,
    }
}

diesel::table! {
    users_user (id) {
        id -> Int8,
        #[max_length = 50]
        username -> Varchar,
        #[max_length = 50]
        email -> Varchar,
        #[max_length = 128]
        password -> Varchar,
        join_date -> Timestamptz,
        last_login -> Nullable<Timestamptz>,
        is_active -> Bool,
    }
}

diesel::table! {
    apartments_favoriteapartment (id) {
        id -> Int8,
        user_id -> Int8,
        apartment_id -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    api_university (id) {
        id -> Int8,
        #[max_length = 50]
        name -> Varchar,
        #[max_length = 200]
        full_name -> Varchar,
        latitude -> Float8,
        longitude -> Float8,
        is_active -> Bool,
    }
}

diesel::table! {
    api_listing_image (id) {
        id -> Int8,
        listing_id -> Int8,
        #[max_length = 500]
        image_url -> Varchar,
        #[max_length = 100]
        label -> Nullable<Varchar>,
        #[sql_name = "order"]
        sort_order -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    apartments_apartmentpost,
    users_user,
    apartments_favoriteapartment,
    api_university,
    api_listing_image,
);
