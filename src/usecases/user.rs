usecase! {
    gets : {
        pub limit: Option<u32>,
    } => {
        pub users: entities::Page<entities::User>,
    }
}
